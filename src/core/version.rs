//! Build metadata and the module API version
//!
//! The generated `version.rs` from the build script is included here so the
//! host and its builtin modules share one source of truth.

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Module API version the host was built with
///
/// Falls back to a stable default if the build script could not read it.
pub fn get_api_version() -> u32 {
    MODULE_API_VERSION.parse().unwrap_or(20250727)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version_matches_manifest() {
        assert_eq!(get_api_version(), 20250727);
    }

    #[test]
    fn test_build_metadata_present() {
        assert!(!build_time().is_empty());
        assert!(!git_hash().is_empty());
    }
}
