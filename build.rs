use chrono::Utc;
use std::env;
use std::fs::{metadata, File};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-changed=.git/HEAD");

    let out_dir = env::var_os("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let dest_path = Path::new(&out_dir).join("version.rs");
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR for build scripts");
    let cargo_toml_path = Path::new(&manifest_dir).join("Cargo.toml");

    if dest_path.exists() && modified(&cargo_toml_path) <= modified(&dest_path) {
        return;
    }

    let cargo_toml_content =
        std::fs::read_to_string(&cargo_toml_path).expect("read Cargo.toml for module_api_version");

    let module_api_version = match cargo_toml_content.parse::<toml::Table>() {
        Ok(cargo_toml) => cargo_toml
            .get("package")
            .and_then(|p| p.as_table())
            .and_then(|p| p.get("metadata"))
            .and_then(|m| m.as_table())
            .and_then(|m| m.get("module_api_version"))
            .and_then(|v| v.as_integer())
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        Err(_) => "unknown".to_string(),
    };
    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let git_hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut f = File::create(&dest_path).expect("create version.rs in OUT_DIR");
    #[allow(clippy::uninlined_format_args)]
    writeln!(
        &mut f,
        r###"pub const MODULE_API_VERSION: &str = "{}";
pub const BUILD_TIME: &str = "{}";
pub const GIT_HASH: &str = "{}";"###,
        module_api_version, build_time, git_hash
    )
    .expect("write version.rs");
}

fn modified(path: &Path) -> SystemTime {
    metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or_else(|e| panic!("read modification time of {}: {}", path.display(), e))
}
