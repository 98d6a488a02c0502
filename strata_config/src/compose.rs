//! Cross-directory composition of base and environment results.

use camino::Utf8Path;
use serde_json::{Map, Value};
use tracing::debug;

/// Overlays the environment tree onto the base tree.
///
/// This is a shallow, top-level override: every top-level key present in the
/// environment tree replaces the base tree's whole subtree for that key. Keys
/// present on only one side pass through unchanged. Overridden keys are
/// reported at debug level; this is not an error.
pub(crate) fn compose(
    base: Map<String, Value>,
    environment: Map<String, Value>,
    env_path: &Utf8Path,
) -> Map<String, Value> {
    let overridden: Vec<String> = base
        .keys()
        .filter(|key| environment.contains_key(*key))
        .cloned()
        .collect();
    if !overridden.is_empty() {
        debug!(
            "Config from path '{env_path}' will override the following existing top-level config keys: {}",
            overridden.join(", "),
        );
    }
    let mut composed = base;
    composed.extend(environment);
    composed
}
