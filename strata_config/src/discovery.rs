//! Candidate-fragment discovery within one configuration directory.
//!
//! Patterns are expanded relative to the directory by matching a glob set
//! against a recursive walk. Matches are filtered to regular files with a
//! recognised extension, canonicalised, deduplicated and returned in sorted
//! order so that downstream merges are reproducible.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::{StrataError, file_error, invalid_data};

/// Extensions recognised as configuration fragments: YAML and JSON.
pub(crate) const RECOGNISED_EXTENSIONS: &[&str] = &["yml", "yaml", "json"];

/// Expands `patterns` against `dir` into a sorted, deduplicated list of
/// canonical fragment paths.
///
/// An empty result is valid; the caller decides whether that is an error.
pub(crate) fn resolve_candidates(
    dir: &Utf8Path,
    patterns: &[String],
) -> Result<Vec<Utf8PathBuf>, StrataError> {
    let glob_set = build_glob_set(patterns)?;
    let mut candidates = BTreeSet::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| file_error(dir.as_std_path(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir.as_std_path()) else {
            continue;
        };
        if !glob_set.is_match(relative) {
            continue;
        }
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        if !has_recognised_extension(path) {
            continue;
        }
        candidates.insert(canonicalise(path)?);
    }
    Ok(candidates.into_iter().collect())
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, StrataError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        // `*` must not cross directory separators; `**` still recurses.
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| StrataError::Pattern {
                pattern: pattern.clone(),
                source: Box::new(e),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| StrataError::Pattern {
        pattern: patterns.join(", "),
        source: Box::new(e),
    })
}

fn has_recognised_extension(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| RECOGNISED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Canonicalise `path` using platform-specific rules.
///
/// On Windows the `dunce` crate is used to avoid introducing UNC prefixes in
/// diagnostic messages.
fn canonicalise(path: &Utf8Path) -> Result<Utf8PathBuf, StrataError> {
    #[cfg(windows)]
    let canonical =
        dunce::canonicalize(path.as_std_path()).map_err(|e| file_error(path.as_std_path(), e))?;
    #[cfg(not(windows))]
    let canonical = std::fs::canonicalize(path.as_std_path())
        .map_err(|e| file_error(path.as_std_path(), e))?;
    Utf8PathBuf::from_path_buf(canonical)
        .map_err(|p| invalid_data(&p, "configuration path is not valid UTF-8"))
}
