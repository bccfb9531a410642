//! Error types for object stores
//!
//! Every store adapter reports failures through [`StoreError`]; callers
//! decide whether a failure was a load or a persist.

use crate::hash::ContentHash;
use crate::store::ObjectKind;
use std::path::PathBuf;

/// Object store failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No object with this address
    #[error("{kind} {id} not found")]
    NotFound { kind: ObjectKind, id: ContentHash },

    /// Stored bytes do not hash to their address
    #[error("{kind} {id} is corrupt: {reason}")]
    Corrupt {
        kind: ObjectKind,
        id: ContentHash,
        reason: String,
    },

    /// Tree violates the node kind/subtree invariant
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    /// Filesystem error
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another process holds the exclusive lock
    #[error("repository at {0} is already locked")]
    Locked(PathBuf),

    /// Directory lacks the repository layout
    #[error("{0} is not a repository")]
    NotARepository(PathBuf),
}

impl StoreError {
    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the object simply does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
