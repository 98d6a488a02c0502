//! The configuration loader: logical-key registry and lookup pipeline.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};

use crate::compose::compose;
use crate::discovery::resolve_candidates;
use crate::engine::MergeEngine;
use crate::error::StrataError;
use crate::fragment::load_fragments;
use crate::merge::merge_directory;
use crate::patterns::ConfigPatterns;

/// Default name of the always-loaded foundational layer.
const DEFAULT_BASE_ENV: &str = "base";
/// Default name of the overlay layer when none is selected.
const DEFAULT_RUN_ENV: &str = "local";

/// Resolves logical configuration keys against a layered directory tree.
///
/// The loader scans `<conf_source>/<base_env>` and `<conf_source>/<run_env>`
/// for fragments matching a key's glob patterns, merges each directory's
/// fragments (same-directory top-level collisions are errors) and overlays
/// the run environment's result onto the base result (cross-directory
/// collisions are logged overrides).
///
/// Lookups are synchronous and cache-free: every call re-reads and re-merges
/// from disk, so repeated calls are idempotent but not cheap. The loader is
/// read-only during a lookup.
///
/// # Examples
///
/// ```rust,no_run
/// use strata_config::ConfigLoader;
///
/// # fn run() -> Result<(), strata_config::StrataError> {
/// let loader = ConfigLoader::builder("conf").env("production").build();
/// let catalog = loader.get("catalog")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    conf_source: Utf8PathBuf,
    env: Option<String>,
    base_env: String,
    default_run_env: String,
    runtime_params: Option<Map<String, Value>>,
    patterns: ConfigPatterns,
    overrides: BTreeMap<String, Map<String, Value>>,
    engine: MergeEngine,
}

impl ConfigLoader {
    /// Creates a loader for `conf_source` with default settings.
    #[must_use]
    pub fn new(conf_source: impl Into<Utf8PathBuf>) -> Self {
        Self::builder(conf_source).build()
    }

    /// Creates a builder initialised for `conf_source`.
    #[must_use]
    pub fn builder(conf_source: impl Into<Utf8PathBuf>) -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new(conf_source)
    }

    /// Resolves `key` to its composed configuration tree.
    ///
    /// Explicit overrides set through [`Self::set`] take precedence and skip
    /// the filesystem entirely. Otherwise the key's patterns are expanded
    /// against the base directory and the effective run-environment
    /// directory, each directory is merged, and the environment result is
    /// overlaid on the base result.
    ///
    /// # Errors
    ///
    /// - [`StrataError::UnknownKey`] when `key` has neither patterns nor an
    ///   explicit override;
    /// - [`StrataError::MissingPath`] when either layer directory does not
    ///   exist (base is checked first);
    /// - [`StrataError::DuplicateKeys`] when two fragments in one directory
    ///   share a top-level key;
    /// - [`StrataError::Parse`] on malformed fragment syntax;
    /// - [`StrataError::MissingConfig`] when both directories exist but no
    ///   fragment matched the key's patterns.
    pub fn get(&self, key: &str) -> Result<Map<String, Value>, StrataError> {
        if let Some(value) = self.overrides.get(key) {
            return Ok(value.clone());
        }
        let Some(patterns) = self.patterns.get(key) else {
            return Err(StrataError::UnknownKey {
                key: key.to_owned(),
            });
        };

        let base_path = self.conf_source.join(&self.base_env);
        let base_config = self.load_directory(&base_path, patterns)?;

        let env_path = self.conf_source.join(self.run_env());
        let env_config = self.load_directory(&env_path, patterns)?;

        let composed = compose(base_config, env_config, &env_path);
        if composed.is_empty() {
            return Err(StrataError::MissingConfig {
                base_path,
                env_path,
                patterns: patterns.to_vec(),
            });
        }
        Ok(composed)
    }

    /// Assigns an explicit value for `key`, bypassing pattern resolution.
    ///
    /// Explicit values form a separate, highest-precedence lookup table; they
    /// never touch the filesystem and shadow any registered patterns.
    pub fn set(&mut self, key: impl Into<String>, value: Map<String, Value>) {
        self.overrides.insert(key.into(), value);
    }

    /// The source root all configuration is resolved under.
    #[must_use]
    pub fn conf_source(&self) -> &Utf8Path {
        &self.conf_source
    }

    /// The effective run environment: the explicit override if one was
    /// supplied, else the configured default.
    #[must_use]
    pub fn run_env(&self) -> &str {
        self.env.as_deref().unwrap_or(&self.default_run_env)
    }

    /// The name of the always-loaded foundational layer.
    #[must_use]
    pub fn base_env(&self) -> &str {
        &self.base_env
    }

    /// Runtime parameters supplied at construction, if any.
    ///
    /// These form an additional highest-precedence overlay applied by the
    /// caller, outside the directory merge.
    #[must_use]
    pub fn runtime_params(&self) -> Option<&Map<String, Value>> {
        self.runtime_params.as_ref()
    }

    /// The logical keys this loader can resolve, sorted and deduplicated.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .patterns
            .keys()
            .chain(self.overrides.keys().map(String::as_str))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    fn load_directory(
        &self,
        dir: &Utf8Path,
        patterns: &[String],
    ) -> Result<Map<String, Value>, StrataError> {
        if !dir.is_dir() {
            return Err(StrataError::MissingPath {
                path: dir.to_owned(),
            });
        }
        let candidates = resolve_candidates(dir, patterns)?;
        let fragments = load_fragments(&self.engine, candidates)?;
        merge_directory(&self.engine, fragments)
    }
}

/// Builder for [`ConfigLoader`].
///
/// Defaults: base environment `"base"`, run environment `"local"`, the
/// built-in pattern registry, and a merge engine with its built-in resolvers
/// cleared.
#[derive(Debug)]
pub struct ConfigLoaderBuilder {
    conf_source: Utf8PathBuf,
    env: Option<String>,
    base_env: Option<String>,
    default_run_env: Option<String>,
    runtime_params: Option<Map<String, Value>>,
    custom_patterns: Vec<(String, Vec<String>)>,
    engine: Option<MergeEngine>,
}

impl ConfigLoaderBuilder {
    /// Creates a builder initialised for `conf_source`.
    #[must_use]
    pub fn new(conf_source: impl Into<Utf8PathBuf>) -> Self {
        Self {
            conf_source: conf_source.into(),
            env: None,
            base_env: None,
            default_run_env: None,
            runtime_params: None,
            custom_patterns: Vec::new(),
            engine: None,
        }
    }

    /// Selects the run environment, taking precedence over the default.
    #[must_use]
    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Overrides the base environment name (default `"base"`).
    #[must_use]
    pub fn base_env(mut self, base_env: impl Into<String>) -> Self {
        self.base_env = Some(base_env.into());
        self
    }

    /// Overrides the default run environment name (default `"local"`).
    #[must_use]
    pub fn default_run_env(mut self, default_run_env: impl Into<String>) -> Self {
        self.default_run_env = Some(default_run_env.into());
        self
    }

    /// Supplies runtime parameters stored on the loader for callers to apply
    /// as their own overlay.
    #[must_use]
    pub fn runtime_params(mut self, params: Map<String, Value>) -> Self {
        self.runtime_params = Some(params);
        self
    }

    /// Registers `patterns` for `key`, overriding a same-named default.
    #[must_use]
    pub fn pattern(mut self, key: impl Into<String>, patterns: Vec<String>) -> Self {
        self.custom_patterns.push((key.into(), patterns));
        self
    }

    /// Supplies a custom merge engine.
    ///
    /// The engine's built-in resolvers are cleared when the loader is built;
    /// resolvers registered through [`MergeEngine::register_resolver`] are
    /// kept.
    #[must_use]
    pub fn merge_engine(mut self, engine: MergeEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Finalises the builder and returns a [`ConfigLoader`].
    #[must_use]
    pub fn build(self) -> ConfigLoader {
        let mut engine = self.engine.unwrap_or_default();
        // Resolver support is kept switched off for now; enabling it later is
        // additive, removing it would break existing configuration.
        engine.clear_builtin_resolvers();

        let mut patterns = ConfigPatterns::default();
        for (key, entry) in self.custom_patterns {
            patterns.insert(key, entry);
        }

        ConfigLoader {
            conf_source: self.conf_source,
            env: self.env,
            base_env: self.base_env.unwrap_or_else(|| DEFAULT_BASE_ENV.to_owned()),
            default_run_env: self
                .default_run_env
                .unwrap_or_else(|| DEFAULT_RUN_ENV.to_owned()),
            runtime_params: self.runtime_params,
            patterns,
            overrides: BTreeMap::new(),
            engine,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, Value, json};

    use super::ConfigLoader;
    use crate::error::StrataError;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected a mapping, got {other:?}"),
        }
    }

    #[test]
    fn unknown_key_fails_without_touching_the_filesystem() {
        let loader = ConfigLoader::new("/nonexistent/conf");
        let err = loader.get("spark").expect_err("expected an unknown key");
        assert!(matches!(err, StrataError::UnknownKey { .. }));
        assert!(err.to_string().contains("spark"));
    }

    #[test]
    fn explicit_overrides_bypass_pattern_resolution() {
        let mut loader = ConfigLoader::new("/nonexistent/conf");
        loader.set("credentials", as_map(json!({"db": {"user": "svc"}})));
        let value = loader.get("credentials").expect("override lookup");
        assert_eq!(Value::Object(value), json!({"db": {"user": "svc"}}));
    }

    #[test]
    fn explicit_overrides_shadow_unknown_keys_too() {
        let mut loader = ConfigLoader::new("/nonexistent/conf");
        loader.set("spark", as_map(json!({"master": "local"})));
        let value = loader.get("spark").expect("override lookup");
        assert_eq!(Value::Object(value), json!({"master": "local"}));
    }

    #[test]
    fn run_env_prefers_the_explicit_override() {
        let loader = ConfigLoader::builder("conf").env("production").build();
        assert_eq!(loader.run_env(), "production");

        let loader = ConfigLoader::new("conf");
        assert_eq!(loader.run_env(), "local");

        let loader = ConfigLoader::builder("conf").default_run_env("dev").build();
        assert_eq!(loader.run_env(), "dev");
    }

    #[test]
    fn keys_cover_patterns_and_overrides() {
        let mut loader = ConfigLoader::new("conf");
        loader.set("spark", Map::new());
        let keys = loader.keys();
        assert!(keys.contains(&"catalog"));
        assert!(keys.contains(&"spark"));
    }

    #[test]
    fn runtime_params_are_stored_verbatim() {
        let params = as_map(json!({"run_id": "abc"}));
        let loader = ConfigLoader::builder("conf")
            .runtime_params(params.clone())
            .build();
        assert_eq!(loader.runtime_params(), Some(&params));
    }
}
