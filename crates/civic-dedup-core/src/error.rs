//! Error kinds surfaced by fingerprinting and the fingerprint stores.

use std::path::PathBuf;

/// Errors produced by the deduplication engine.
///
/// A classification that finds nothing is not an error: callers get a
/// `unique` [`DeduplicationResult`](crate::models::DeduplicationResult).
#[derive(Debug, thiserror::Error)]
pub enum DedupError {
    /// A source file or store file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted store state failed to parse.
    ///
    /// Stores recover from this by starting empty; it is only returned
    /// from the low-level table loaders.
    #[error("malformed store at {path}: {reason}")]
    MalformedStore { path: PathBuf, reason: String },

    /// The caller passed a missing or empty required identifier.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A storage backend (e.g. SQLite) rejected an operation.
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl DedupError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn storage(message: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DedupError>;
