//! Resolution of caller path patterns into existing filesystem entries.

use hoard_core::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Resolve `patterns` into a sorted, deduplicated list of existing entries.
///
/// Entries under `working_dir` are returned relative to it; entries outside
/// it are returned as normalized absolute paths. Patterns support `~` for the
/// home directory, glob wildcards, and a `!` prefix that excludes matches of
/// earlier patterns.
pub fn resolve_paths(patterns: &[String], working_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut resolved = BTreeSet::new();

    for raw in patterns {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (negate, pattern) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let pattern = absolute_pattern(&expand_home(pattern)?, working_dir);

        if negate {
            let compiled = glob::Pattern::new(&pattern)
                .map_err(|e| Error::PathValidation(format!("Invalid pattern {}: {}", raw, e)))?;
            resolved.retain(|rel: &PathBuf| !compiled.matches_path(&working_dir.join(rel)));
            continue;
        }

        let matches = glob::glob(&pattern)
            .map_err(|e| Error::PathValidation(format!("Invalid pattern {}: {}", raw, e)))?;
        for entry in matches {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(pattern = %raw, error = %e, "Skipping unreadable path");
                    continue;
                }
            };
            let entry = archive_entry_path(&path, working_dir);
            debug!(path = %entry.display(), "Resolved cache path");
            resolved.insert(entry);
        }
    }

    Ok(resolved.into_iter().collect())
}

fn expand_home(pattern: &str) -> Result<String> {
    if pattern != "~" && !pattern.starts_with("~/") {
        return Ok(pattern.to_string());
    }
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;
    let home = glob::Pattern::escape(&dirs.home_dir().to_string_lossy());
    Ok(format!("{}{}", home, &pattern[1..]))
}

fn absolute_pattern(pattern: &str, working_dir: &Path) -> String {
    if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let base = glob::Pattern::escape(&working_dir.to_string_lossy());
        format!("{}{}{}", base, std::path::MAIN_SEPARATOR, pattern)
    }
}

fn archive_entry_path(path: &Path, working_dir: &Path) -> PathBuf {
    let path = normalize(path);
    match path.strip_prefix(normalize(working_dir)) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path,
    }
}

/// Lexically drop `.` and resolve `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
