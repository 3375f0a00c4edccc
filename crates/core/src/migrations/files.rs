//! Migration file discovery and version ordering

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::MigrationFile;
use crate::error::{EngineError, EngineResult};

/// Pattern for valid migration files: leading digit, `.sql` suffix
static MIGRATION_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d.*\.sql$").expect("valid migration file pattern"));

/// List migration filenames in `dir`, lexicographically ascending.
///
/// Fixed-width numeric-timestamp prefixes make this equivalent to
/// chronological order.
pub fn list_migration_files(dir: &Path) -> EngineResult<Vec<String>> {
    let mut matches: Vec<String> = read_file_names(dir)?
        .into_iter()
        .filter(|name| MIGRATION_FILE_PATTERN.is_match(name))
        .collect();
    matches.sort();
    Ok(matches)
}

/// List candidate migrations with their extracted versions, in
/// ascending version order.
pub fn list_migrations(dir: &Path) -> EngineResult<Vec<MigrationFile>> {
    Ok(list_migration_files(dir)?
        .into_iter()
        .map(|filename| MigrationFile {
            version: migration_version(&filename).to_string(),
            path: dir.join(&filename),
            filename,
        })
        .collect())
}

/// Longest leading run of digit characters in `filename`.
pub fn migration_version(filename: &str) -> &str {
    let end = filename
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(filename.len());
    &filename[..end]
}

/// Resolve `version` to a single migration filename.
///
/// When several files share the version prefix the first lexicographic
/// match wins; the ambiguity is not rejected.
pub fn find_migration_file(dir: &Path, version: &str) -> EngineResult<String> {
    debug_assert!(!version.is_empty(), "migration version is required");

    let mut matches: Vec<String> = read_file_names(dir)?
        .into_iter()
        .filter(|name| name.starts_with(version) && name.ends_with(".sql"))
        .collect();
    matches.sort();

    matches
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::MigrationNotFound(version.to_string()))
}

fn read_file_names(dir: &Path) -> EngineResult<Vec<String>> {
    let entries =
        fs::read_dir(dir).map_err(|_| EngineError::DirectoryNotFound(dir.to_path_buf()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
