//! Parse, interpolation and deep-merge facility shared by every lookup.
//!
//! The engine is injected into the loader so that resolver configuration is
//! per-instance state rather than a process-wide mutation. Deep merging is
//! delegated to Figment: fragment trees are folded left-to-right as
//! [`Serialized`] providers, which combines nested mappings recursively with
//! rightmost-wins semantics on leaves.

mod interpolate;
mod parse;

use std::collections::BTreeMap;

use camino::Utf8Path;
use figment::{Figment, providers::Serialized};
use serde_json::{Map, Value};

use crate::error::{StrataError, file_error};

/// A named interpolation resolver, invoked for `${name:argument}` references.
pub type Resolver = fn(&str) -> Result<Value, String>;

/// Resolvers registered by [`MergeEngine::new`].
///
/// Loaders clear these at construction; resolver support is opt-in per
/// engine instance.
const BUILTIN_RESOLVERS: &[(&str, Resolver)] = &[("env", env_resolver)];

fn env_resolver(arg: &str) -> Result<Value, String> {
    std::env::var(arg)
        .map(Value::String)
        .map_err(|_| format!("environment variable '{arg}' is not set"))
}

/// Parses fragments, resolves in-document interpolation and deep-merges
/// fragment trees.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    resolvers: BTreeMap<String, Resolver>,
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeEngine {
    /// Creates an engine with the built-in resolvers registered.
    #[must_use]
    pub fn new() -> Self {
        let resolvers = BUILTIN_RESOLVERS
            .iter()
            .map(|(name, resolver)| ((*name).to_owned(), *resolver))
            .collect();
        Self { resolvers }
    }

    /// Removes the built-in resolvers from this engine instance.
    ///
    /// Custom resolvers registered through [`Self::register_resolver`] are
    /// kept.
    pub fn clear_builtin_resolvers(&mut self) {
        for (name, _) in BUILTIN_RESOLVERS {
            self.resolvers.remove(*name);
        }
    }

    /// Registers `resolver` under `name`, replacing any existing entry.
    pub fn register_resolver(&mut self, name: impl Into<String>, resolver: Resolver) {
        self.resolvers.insert(name.into(), resolver);
    }

    pub(crate) fn resolver(&self, name: &str) -> Option<Resolver> {
        self.resolvers.get(name).copied()
    }

    /// Reads and parses one fragment, resolving in-document interpolation.
    ///
    /// Empty documents parse as empty mappings; any other non-mapping root is
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::File`] when the file cannot be read or does not
    /// define a top-level mapping, [`StrataError::Parse`] on malformed syntax
    /// and [`StrataError::Interpolation`] on unresolvable references.
    pub fn load(&self, path: &Utf8Path) -> Result<Map<String, Value>, StrataError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| file_error(path.as_std_path(), e))?;
        let tree = parse::parse_by_format(path, &data)?;
        interpolate::resolve_tree(self, path, tree)
    }

    /// Deep-merges fragment trees left-to-right, rightmost wins on leaves.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Merge`] when Figment fails to combine or
    /// extract the merged tree.
    pub fn merge<I>(&self, trees: I) -> Result<Map<String, Value>, StrataError>
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let mut figment = Figment::new();
        for tree in trees {
            figment = figment.merge(Serialized::defaults(tree));
        }
        figment.extract().map_err(StrataError::merge)
    }
}
