//! Build identification shared by the ORA binaries
//!
//! Each binary crate's `build.rs` exports `GIT_HASH`, `BUILD_TIMESTAMP` and
//! `BUILD_PROFILE`. [`build_info!`](crate::build_info) reads them in the
//! calling crate, so the values belong to that binary.

use serde::Serialize;

/// Version and build metadata of one binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

impl BuildInfo {
    /// Startup log line, e.g. `Starting ORA loader (ora-etl) v0.1.0 [1a2b3c4d] built ... (release)`
    pub fn banner(&self, title: &str, binary: &str) -> String {
        format!(
            "Starting {} ({}) v{} [{}] built {} ({})",
            title, binary, self.version, self.git_hash, self.build_timestamp, self.build_profile
        )
    }
}

/// [`BuildInfo`] of the crate that expands this macro
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::build_info::BuildInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_hash: env!("GIT_HASH").to_string(),
            build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
            build_profile: env!("BUILD_PROFILE").to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner() {
        let info = BuildInfo {
            version: "0.1.0".to_string(),
            git_hash: "1a2b3c4d".to_string(),
            build_timestamp: "2026-03-10T02:00:00Z".to_string(),
            build_profile: "release".to_string(),
        };
        assert_eq!(
            info.banner("ORA loader", "ora-etl"),
            "Starting ORA loader (ora-etl) v0.1.0 [1a2b3c4d] built 2026-03-10T02:00:00Z (release)"
        );
    }
}
