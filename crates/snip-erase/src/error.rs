//! Error types for erase
//!
//! One closed set of failures so the command layer and tests can branch on
//! the kind of failure rather than on message text:
//! - Path parsing (empty path)
//! - Snapshot selection
//! - Loading trees, snapshots or the index
//! - Walking the tree (missing component, non-directory in the middle)
//! - Persisting trees, snapshots or the index

use snip_object::{NodeKind, StoreError};

/// Exit code for a snapshot that could not be selected
pub const EXIT_SELECTOR: i32 = 1;
/// Exit code for every other erase failure
pub const EXIT_FAILURE: i32 = 2;

/// Erase failure
#[derive(Debug, thiserror::Error)]
pub enum EraseError {
    /// Path has no non-empty components
    #[error("empty path components")]
    EmptyPath,

    /// Snapshot id or "latest" could not be resolved
    #[error("cannot resolve snapshot {selector}: {source}")]
    SelectorResolution {
        selector: String,
        #[source]
        source: SelectorError,
    },

    /// Repository lock could not be taken
    #[error("cannot lock repository: {0}")]
    Lock(#[source] StoreError),

    /// Tree, snapshot or index unreadable
    #[error("cannot load {what}: {source}")]
    Load {
        what: String,
        #[source]
        source: StoreError,
    },

    /// Named component absent at some level
    #[error("path {partial_path:?} not found in snapshot")]
    PathNotFound {
        component: String,
        partial_path: String,
    },

    /// Intermediate component is not a directory
    #[error("{path:?} should be a dir, but is a {actual_kind}")]
    NotADirectory { path: String, actual_kind: NodeKind },

    /// Tree, snapshot or index write failed
    #[error("cannot store {what}: {source}")]
    Persist {
        what: String,
        #[source]
        source: StoreError,
    },
}

impl EraseError {
    pub(crate) fn load(what: impl Into<String>, source: StoreError) -> Self {
        Self::Load {
            what: what.into(),
            source,
        }
    }

    pub(crate) fn persist(what: impl Into<String>, source: StoreError) -> Self {
        Self::Persist {
            what: what.into(),
            source,
        }
    }

    /// Process exit code the command layer should use
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SelectorResolution { .. } => EXIT_SELECTOR,
            _ => EXIT_FAILURE,
        }
    }
}

/// Why a snapshot selector did not resolve
#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    /// No snapshot matched
    #[error("no matching snapshot found")]
    NoMatch,

    /// Id prefix matched several snapshots
    #[error("prefix is ambiguous, {0} snapshots match")]
    Ambiguous(usize),

    /// Selector is not a hex id prefix
    #[error("invalid snapshot id {0:?}")]
    InvalidId(String),

    /// Snapshot listing failed
    #[error("cannot list snapshots: {0}")]
    Listing(#[source] StoreError),

    /// A candidate snapshot could not be read
    #[error("cannot load candidate snapshot: {0}")]
    Candidate(#[source] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_failure_kind() {
        let selector = EraseError::SelectorResolution {
            selector: "latest".into(),
            source: SelectorError::NoMatch,
        };
        assert_eq!(selector.exit_code(), EXIT_SELECTOR);
        assert_eq!(EraseError::EmptyPath.exit_code(), EXIT_FAILURE);
        let missing = EraseError::PathNotFound {
            component: "b".into(),
            partial_path: "a/b".into(),
        };
        assert_eq!(missing.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn messages_name_the_path() {
        let err = EraseError::NotADirectory {
            path: "a/b.txt".into(),
            actual_kind: NodeKind::File,
        };
        assert_eq!(err.to_string(), "\"a/b.txt\" should be a dir, but is a file");

        let err = EraseError::PathNotFound {
            component: "x".into(),
            partial_path: "a/x".into(),
        };
        assert_eq!(err.to_string(), "path \"a/x\" not found in snapshot");
    }
}
