//! Layered configuration resolution over directory trees of YAML and JSON
//! fragments.
//!
//! Applications keep a foundational `base` layer plus environment overlays
//! (for example `local` or `production`), each split across many small files
//! discovered by glob patterns. A [`ConfigLoader`] resolves a logical key
//! (such as `catalog` or `credentials`) by expanding the key's patterns
//! against `<conf_source>/<base_env>` and `<conf_source>/<run_env>`, merging
//! each directory's fragments and overlaying the run environment's result on
//! the base result.
//!
//! Conflict policy: two fragments in the *same* directory defining the same
//! top-level key is an error naming both files; the same key appearing
//! *across* directories is a silent override (the run environment wins) that
//! is reported at debug level.
//!
//! ```rust,no_run
//! use strata_config::ConfigLoader;
//!
//! # fn run() -> Result<(), strata_config::StrataError> {
//! let loader = ConfigLoader::builder("conf").env("local").build();
//! let catalog = loader.get("catalog")?;
//! let parameters = loader.get("parameters")?;
//! # Ok(())
//! # }
//! ```

mod compose;
mod discovery;
mod engine;
mod error;
mod fragment;
mod loader;
mod merge;
mod patterns;

pub use engine::{MergeEngine, Resolver};
pub use error::StrataError;
pub use loader::{ConfigLoader, ConfigLoaderBuilder};
pub use patterns::ConfigPatterns;

pub use serde_json;
