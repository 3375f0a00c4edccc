//! Migration types and file handling
//!
//! Covers everything between the filesystem and the executor: candidate
//! file discovery, Up/Down section parsing, and the naive statement
//! splitter used for emulated execution.

pub mod files;
pub mod parser;
pub mod statements;

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The authoritative record of applied migrations, keyed by version.
///
/// Loaded fresh from the bookkeeping table on every invocation; never
/// cached across runs.
pub type AppliedVersionSet = HashMap<String, bool>;

/// One candidate migration file on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationFile {
    /// Longest leading run of digit characters in the filename
    pub version: String,
    /// Bare filename within the migrations directory
    pub filename: String,
    /// Full path to the file
    pub path: PathBuf,
}

/// Direction of a migration script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptDirection {
    /// Apply the migration
    Up,
    /// Revert the migration
    Down,
}

/// One parsed section of a migration file
///
/// Produced fresh from a parse and never persisted.
#[derive(Debug, Clone)]
pub struct MigrationScript {
    pub direction: ScriptDirection,
    /// Verbatim text between this section's marker and the next marker
    /// (or end of file)
    pub contents: String,
    /// `key:value` tokens from the marker line; unrecognized keys are
    /// preserved but otherwise ignored
    pub options: HashMap<String, String>,
}

impl MigrationScript {
    /// Whether this section should run inside a transaction.
    ///
    /// Defaults to true; only an explicit `transaction:false` disables
    /// wrapping.
    pub fn transaction(&self) -> bool {
        self.options.get("transaction").map(String::as_str) != Some("false")
    }
}

/// Applied/pending state of one migration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    pub filename: String,
    pub applied: bool,
}
