//! Parsed configuration fragments.

use std::collections::BTreeSet;

use camino::Utf8PathBuf;
use serde_json::{Map, Value};

use crate::engine::MergeEngine;
use crate::error::StrataError;

/// One parsed configuration file's tree, scoped to one directory.
#[derive(Debug, Clone)]
pub(crate) struct Fragment {
    /// Canonical path the fragment was read from.
    pub(crate) path: Utf8PathBuf,
    /// The fragment's root mapping.
    pub(crate) tree: Map<String, Value>,
}

impl Fragment {
    /// The fragment's top-level keys, the unit of duplicate detection.
    pub(crate) fn top_level_keys(&self) -> BTreeSet<&str> {
        self.tree.keys().map(String::as_str).collect()
    }
}

/// Loads every candidate path into a [`Fragment`], preserving the candidate
/// order.
pub(crate) fn load_fragments(
    engine: &MergeEngine,
    paths: Vec<Utf8PathBuf>,
) -> Result<Vec<Fragment>, StrataError> {
    paths
        .into_iter()
        .map(|path| {
            let tree = engine.load(&path)?;
            Ok(Fragment { path, tree })
        })
        .collect()
}
