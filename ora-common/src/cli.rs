//! Command-line arguments shared by every ORA binary

use clap::Args;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Database connection flags, flattened into each binary's `Args`
#[derive(Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// Path to a TOML config file (default: ~/.config/ora/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// MongoDB connection string (overrides MONGODB_URI)
    #[arg(long, value_name = "URI")]
    pub mongodb_uri: Option<String>,

    /// Database name (overrides DATABASE_NAME)
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Collection name (overrides COLLECTION_NAME)
    #[arg(long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Log filter when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", env = "ORA_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl DatabaseArgs {
    /// Convert into tier-1 overrides; callers fill in their own extra fields
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            mongodb_uri: self.mongodb_uri.clone(),
            database_name: self.database.clone(),
            collection_name: self.collection.clone(),
            log_level: self.log_level.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestArgs {
        #[command(flatten)]
        db: DatabaseArgs,
    }

    #[test]
    fn test_database_args_map_to_overrides() {
        let args = TestArgs::parse_from([
            "test",
            "--mongodb-uri",
            "mongodb://localhost:27017",
            "--database",
            "reporting",
            "--log-level",
            "debug",
        ]);

        let overrides = args.db.overrides();
        assert_eq!(overrides.mongodb_uri.as_deref(), Some("mongodb://localhost:27017"));
        assert_eq!(overrides.database_name.as_deref(), Some("reporting"));
        assert_eq!(overrides.log_level.as_deref(), Some("debug"));
        assert!(overrides.collection_name.is_none());
        assert!(overrides.config_file.is_none());
    }
}
