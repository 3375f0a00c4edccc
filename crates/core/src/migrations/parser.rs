//! Migration file parsing
//!
//! Splits one migration file into Up and Down scripts. Each section
//! begins with a marker line (`-- migrate:up` / `-- migrate:down`),
//! optionally followed by whitespace-separated `key:value` options; the
//! section's contents are the verbatim text up to the next marker or
//! end of file, including whitespace and comments.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{MigrationScript, ScriptDirection};
use crate::error::{EngineError, EngineResult};

static MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^--\s*migrate:(up|down)(?:\s+(.*))?\s*$").expect("valid marker pattern"));

/// Parse a migration file into its Up and Down scripts.
///
/// A missing section yields an empty script with default options; a
/// file with no recognizable marker at all is a parse error.
pub fn parse_migration(path: &Path) -> EngineResult<(MigrationScript, MigrationScript)> {
    let text = fs::read_to_string(path)?;
    parse_migration_text(path, &text)
}

fn parse_migration_text(
    path: &Path,
    text: &str,
) -> EngineResult<(MigrationScript, MigrationScript)> {
    let mut up_options: Option<HashMap<String, String>> = None;
    let mut down_options: Option<HashMap<String, String>> = None;
    let mut up_contents = String::new();
    let mut down_contents = String::new();
    let mut current: Option<ScriptDirection> = None;

    for raw_line in text.split_inclusive('\n') {
        let line = raw_line.trim_end_matches(['\n', '\r']);

        if let Some(caps) = MARKER_PATTERN.captures(line) {
            let options = parse_options(caps.get(2).map_or("", |m| m.as_str()));
            match &caps[1] {
                "up" => {
                    up_options = Some(options);
                    current = Some(ScriptDirection::Up);
                }
                _ => {
                    down_options = Some(options);
                    current = Some(ScriptDirection::Down);
                }
            }
            continue;
        }

        match current {
            Some(ScriptDirection::Up) => up_contents.push_str(raw_line),
            Some(ScriptDirection::Down) => down_contents.push_str(raw_line),
            // Text before the first marker is not part of any section.
            None => {}
        }
    }

    if up_options.is_none() && down_options.is_none() {
        return Err(EngineError::Parse {
            path: path.to_path_buf(),
            reason: "no '-- migrate:up' or '-- migrate:down' marker found".to_string(),
        });
    }

    Ok((
        MigrationScript {
            direction: ScriptDirection::Up,
            contents: up_contents,
            options: up_options.unwrap_or_default(),
        },
        MigrationScript {
            direction: ScriptDirection::Down,
            contents: down_contents,
            options: down_options.unwrap_or_default(),
        },
    ))
}

/// Parse whitespace-separated `key:value` tokens from a marker line.
///
/// Tokens without a `:` are ignored; unrecognized keys are preserved
/// for forward compatibility.
fn parse_options(text: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    for token in text.split_whitespace() {
        if let Some((key, value)) = token.split_once(':') {
            options.insert(key.to_string(), value.to_string());
        }
    }
    options
}
