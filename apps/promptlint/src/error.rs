//! Error types for rule loading and linting.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a usable rule document.
///
/// Always fatal: no evaluation can run without rules, and nothing here is
/// retried.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The rule document could not be read from disk.
    #[error("failed to read rule document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rule document is not valid JSON or does not fit the schema.
    #[error("rule document {origin} is malformed: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The rule document parsed but violates a structural invariant.
    #[error("rule document is invalid: {0}")]
    Invalid(String),
}

impl ConfigLoadError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Crate-level error returned by the public linting API.
#[derive(Debug, Error)]
pub enum PromptLintError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    /// A built-in rule was requested by a code that is not registered.
    #[error("unknown rule code: {0}")]
    UnknownRule(String),

    /// A section key outside the six known sections.
    #[error("unknown section key: {0}")]
    UnknownSection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
