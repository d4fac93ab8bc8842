//! Local-file content source.
//!
//! Scans a configured content directory for text files matching the include
//! globs, skipping excludes. Each file becomes one raw document keyed by its
//! path relative to the root.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::FilesSourceConfig;
use crate::error::{AdvisorError, Result};

/// Scan the content directory and return `(relative path, body)` pairs,
/// sorted by path for deterministic corpus ordering.
pub fn scan_files(config: &FilesSourceConfig) -> Result<Vec<(String, String)>> {
    let root = &config.root;
    if !root.exists() {
        return Err(AdvisorError::ContentUnavailable(format!(
            "content directory does not exist: {}",
            root.display()
        )));
    }

    let include_set = build_globset(&config.include_globs)?;
    let exclude_set = build_globset(&config.exclude_globs)?;

    let mut docs = Vec::new();

    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.map_err(|e| AdvisorError::ContentUnavailable(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        // Unreadable or non-UTF-8 files are skipped, not fatal.
        match std::fs::read_to_string(path) {
            Ok(body) => docs.push((rel_str, body)),
            Err(e) => {
                tracing::warn!(file = %rel_str, error = %e, "skipping unreadable file");
            }
        }
    }

    docs.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(docs)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| AdvisorError::Config(format!("invalid glob '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| AdvisorError::Config(e.to_string()))
}
