//! Error types produced by the configuration loader.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving a logical configuration key.
///
/// Every variant is terminal for the lookup that raised it; the loader itself
/// remains usable for other keys afterwards.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StrataError {
    /// The requested logical key has no registered patterns and no explicit
    /// override.
    #[error("no config patterns were found for '{key}' in this config loader")]
    UnknownKey {
        /// Logical key that was requested.
        key: String,
    },

    /// A required configuration directory does not exist.
    #[error("given configuration path either does not exist or is not a valid directory: {path}")]
    MissingPath {
        /// Directory that was expected to exist.
        path: Utf8PathBuf,
    },

    /// Two fragments in the same directory define the same top-level key.
    ///
    /// The details list one line per offending file pair, naming both paths
    /// and the sorted overlapping keys.
    #[error("{details}")]
    DuplicateKeys {
        /// Newline-separated description of every colliding file pair.
        details: String,
    },

    /// A fragment contains malformed YAML or JSON syntax.
    #[error("invalid YAML or JSON file '{path}', unable to read line {line}, column {column}: {message}")]
    Parse {
        /// Fragment that failed to parse.
        path: Utf8PathBuf,
        /// 1-based line of the offending token.
        line: usize,
        /// 1-based column of the offending token.
        column: usize,
        /// Message reported by the underlying parser.
        message: String,
    },

    /// Both layer directories exist but no fragment matched the key's
    /// patterns.
    #[error(
        "no files of YAML or JSON format found in {base_path} or {env_path} \
         matching the glob pattern(s): {patterns:?}"
    )]
    MissingConfig {
        /// Base-environment directory that was searched.
        base_path: Utf8PathBuf,
        /// Run-environment directory that was searched.
        env_path: Utf8PathBuf,
        /// Patterns that were expanded against both directories.
        patterns: Vec<String>,
    },

    /// Error originating from a configuration file or directory.
    #[error("configuration file error in '{path}': {source}")]
    File {
        /// Path that triggered the failure.
        path: std::path::PathBuf,
        /// Underlying error reported while reading or validating the file.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A glob pattern failed to compile.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        /// Pattern that was rejected.
        pattern: String,
        /// Underlying error reported by the glob compiler.
        #[source]
        source: Box<globset::Error>,
    },

    /// An interpolation reference inside a fragment could not be resolved.
    #[error("failed to resolve interpolation '${{{reference}}}' in '{path}': {message}")]
    Interpolation {
        /// Fragment containing the reference.
        path: Utf8PathBuf,
        /// The reference text between the braces.
        reference: String,
        /// Explanation of the failure.
        message: String,
    },

    /// Failure while deep-merging fragment trees.
    #[error("failed to merge configuration fragments: {source}")]
    Merge {
        /// Underlying error describing the merge failure.
        #[source]
        source: Box<figment::Error>,
    },
}

impl StrataError {
    /// Construct a merge error from a [`figment::Error`].
    #[must_use]
    pub fn merge(source: figment::Error) -> Self {
        Self::Merge {
            source: Box::new(source),
        }
    }
}

/// Construct a [`StrataError::File`] for a configuration path.
pub(crate) fn file_error(
    path: &std::path::Path,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> StrataError {
    StrataError::File {
        path: path.to_path_buf(),
        source: err.into(),
    }
}

pub(crate) fn invalid_data(path: &std::path::Path, msg: impl Into<String>) -> StrataError {
    file_error(
        path,
        std::io::Error::new(std::io::ErrorKind::InvalidData, msg.into()),
    )
}

pub(crate) fn interpolation_error(
    path: &camino::Utf8Path,
    reference: impl Into<String>,
    message: impl Into<String>,
) -> StrataError {
    StrataError::Interpolation {
        path: path.to_owned(),
        reference: reference.into(),
        message: message.into(),
    }
}
