//! Engine configuration
//!
//! One explicit [`Config`] value is constructed per invocation; the
//! engine holds no process-wide mutable state.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Default directory to find migration files
pub const DEFAULT_MIGRATIONS_DIR: &str = "./db/migrations";

/// Default location for the generated schema file
pub const DEFAULT_SCHEMA_FILE: &str = "./db/schema.sql";

/// Default length of time between connection attempts
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(1);

/// Default maximum time for connection attempts
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration consumed by the migration engine
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection descriptor for the target database
    pub database_url: Url,
    /// Directory where migration files are stored
    pub migrations_dir: PathBuf,
    /// Path of the generated schema file
    pub schema_file: PathBuf,
    /// Regenerate the schema file after each successful migrate/rollback
    pub auto_dump_schema: bool,
    /// Block until the server is reachable before operating
    pub wait_before: bool,
    /// Time between connection attempts while waiting
    pub wait_interval: Duration,
    /// Maximum time to wait for the server
    pub wait_timeout: Duration,
    /// Submit whole scripts to the backend in one call when it supports that
    pub native_engine: bool,
}

impl Config {
    /// Create a configuration with default paths and timings for the
    /// given database.
    pub fn new(database_url: Url) -> Self {
        Self {
            database_url,
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            schema_file: PathBuf::from(DEFAULT_SCHEMA_FILE),
            auto_dump_schema: true,
            wait_before: false,
            wait_interval: DEFAULT_WAIT_INTERVAL,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            native_engine: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let url = Url::parse("postgres://localhost/app").unwrap();
        let config = Config::new(url);

        assert_eq!(config.migrations_dir, PathBuf::from("./db/migrations"));
        assert_eq!(config.schema_file, PathBuf::from("./db/schema.sql"));
        assert!(config.auto_dump_schema);
        assert!(!config.wait_before);
        assert_eq!(config.wait_interval, Duration::from_secs(1));
        assert_eq!(config.wait_timeout, Duration::from_secs(60));
        assert!(config.native_engine);
    }
}
