//! Configuration integration tests
//!
//! Loads TOML files from disk and applies command line overrides the way
//! startup does.

use clap::Parser;
use hotmod::app::cli::Args;
use hotmod::app::config::{ConfigError, RuntimeConfig};
use hotmod::core::logging::LogFormat;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

fn args_for(file: &NamedTempFile, extra: &[&str]) -> Args {
    let path = file.path().to_string_lossy().to_string();
    let mut argv = vec!["hotmod".to_string(), "--config-file".to_string(), path];
    argv.extend(extra.iter().map(|s| s.to_string()));
    Args::try_parse_from(argv).expect("arguments should parse")
}

#[tokio::test]
async fn test_file_values_reach_registry_config() {
    let file = config_file(
        r#"
        watchdog_ms = 300
        rollback_on_failure = true
        "#,
    );
    let config = RuntimeConfig::resolve(&args_for(&file, &[])).await.unwrap();

    let registry = config.registry_config();
    assert_eq!(registry.watchdog_delay, Duration::from_millis(300));
    assert!(registry.rollback_on_failure);
}

#[tokio::test]
async fn test_command_line_overrides_file() {
    let file = config_file(
        r#"
        watchdog_ms = 300
        exclude_modules = ["heartbeat"]

        [log]
        level = "warn"
        format = "json"
        "#,
    );
    let args = args_for(
        &file,
        &["--watchdog-ms", "75", "--exclude-module", "clock", "--log-format", "ext", "-v"],
    );
    let config = RuntimeConfig::resolve(&args).await.unwrap();

    assert_eq!(config.watchdog_ms, 75);
    assert_eq!(config.exclude_modules, vec!["heartbeat", "clock"]);
    assert_eq!(config.log.format, LogFormat::Ext);
    assert_eq!(config.log.level, "info");
}

#[tokio::test]
async fn test_invalid_file_is_reported() {
    let file = config_file("watchdog_ms = \"soon\"\n");
    let err = RuntimeConfig::resolve(&args_for(&file, &[])).await.unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("Error parsing configuration file"));
}

#[tokio::test]
async fn test_zero_watchdog_rejected() {
    let file = config_file("watchdog_ms = 0\n");
    let err = RuntimeConfig::resolve(&args_for(&file, &[])).await.unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[tokio::test]
async fn test_missing_config_file_is_an_error() {
    let args = Args::try_parse_from(["hotmod", "--config-file", "/nonexistent/hotmod.toml"]).unwrap();
    let err = RuntimeConfig::resolve(&args).await.unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}
