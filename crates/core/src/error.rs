//! Error types for the migration engine
//!
//! Every top-level operation aborts on its first failure and returns one
//! of these variants to the caller; there is no partial-success mode.

use std::path::PathBuf;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error types for migration engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The migrations directory could not be read
    #[error("could not find migrations directory `{0}`")]
    DirectoryNotFound(PathBuf),

    /// The migrations directory contains no migration files
    #[error("no migration files found")]
    NoMigrationFiles,

    /// A migration file has no recognizable section markers
    #[error("could not parse migration `{path}`: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// An applied version could not be resolved to a migration file
    #[error("can't find migration file: {0}*.sql")]
    MigrationNotFound(String),

    /// The database server did not become reachable within the timeout
    #[error("unable to connect to database: {last_error}")]
    ConnectionTimeout { last_error: String },

    /// Rollback was requested but no migrations have been applied
    #[error("can't rollback: no migrations have been applied")]
    NothingToRollBack,

    /// A new migration would overwrite an existing file
    #[error("file already exists: {0}")]
    FileExists(PathBuf),

    /// A new migration was requested without a name
    #[error("please specify a name for the new migration")]
    MissingName,

    /// The backend reported a failure
    #[error("{0}")]
    Execution(String),

    /// Filesystem error while reading or writing migration artifacts
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
