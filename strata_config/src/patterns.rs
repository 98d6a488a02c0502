//! Registry mapping logical configuration keys to glob pattern lists.

use std::collections::BTreeMap;

/// Logical keys every loader understands out of the box.
const DEFAULT_KEYS: &[&str] = &["catalog", "parameters", "credentials", "logging"];

/// Ordered glob patterns registered per logical configuration key.
///
/// Each built-in key ships with three pattern variants so fragments can be
/// organised flat, one level deep, or arbitrarily nested:
/// `<name>*`, `<name>*/**` and `**/<name>*`. Caller-supplied entries override
/// same-named defaults wholesale.
#[derive(Debug, Clone)]
pub struct ConfigPatterns {
    table: BTreeMap<String, Vec<String>>,
}

impl Default for ConfigPatterns {
    fn default() -> Self {
        let table = DEFAULT_KEYS
            .iter()
            .map(|key| ((*key).to_owned(), default_patterns(key)))
            .collect();
        Self { table }
    }
}

fn default_patterns(name: &str) -> Vec<String> {
    vec![
        format!("{name}*"),
        format!("{name}*/**"),
        format!("**/{name}*"),
    ]
}

impl ConfigPatterns {
    /// Registers `patterns` for `key`, replacing any existing entry.
    pub fn insert(&mut self, key: impl Into<String>, patterns: Vec<String>) {
        self.table.insert(key.into(), patterns);
    }

    /// Returns the patterns registered for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.table.get(key).map(Vec::as_slice)
    }

    /// Returns `true` when `key` has registered patterns.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// Iterates over the registered logical keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}
