//! Object store capabilities
//!
//! [`ObjectStore`] is what tree rewriting needs: load and save by address.
//! [`Repository`] adds the lifecycle a command runs around it (exclusive
//! lock, index, flush) and snapshot listing for selection.

use crate::error::StoreResult;
use crate::hash::ContentHash;
use crate::snapshot::Snapshot;
use crate::tree::Tree;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Kinds of stored objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Tree,
    Snapshot,
}

impl ObjectKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Snapshot => "snapshot",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content-addressed load/save of trees and snapshots
///
/// Saving is deterministic: identical content yields the identical address,
/// and saving an object that already exists is not an error.
///
/// Not `dyn`-compatible because of the generic `save_unpacked`.
pub trait ObjectStore {
    /// Load and validate a tree
    ///
    /// # Errors
    /// Returns error if the tree is absent or corrupt
    fn load_tree(&self, id: &ContentHash) -> StoreResult<Tree>;

    /// Persist a tree, returning its address
    ///
    /// # Errors
    /// Returns error if the tree cannot be written
    fn save_tree(&self, tree: &Tree) -> StoreResult<ContentHash>;

    /// Load a snapshot
    ///
    /// # Errors
    /// Returns error if the snapshot is absent or corrupt
    fn load_snapshot(&self, id: &ContentHash) -> StoreResult<Snapshot>;

    /// Persist `value` as a standalone JSON object of `kind`
    ///
    /// # Errors
    /// Returns error if the object cannot be encoded or written
    fn save_unpacked<T: Serialize>(&self, kind: ObjectKind, value: &T)
        -> StoreResult<ContentHash>;
}

/// A whole repository: object store plus its maintenance lifecycle
pub trait Repository: ObjectStore {
    /// Held for as long as the exclusive lock should last
    type Lock;

    /// Take the repository-wide exclusive lock
    ///
    /// # Errors
    /// Returns [`crate::StoreError::Locked`] if someone else holds it
    fn lock_exclusive(&self) -> StoreResult<Self::Lock>;

    /// Read the index of known trees
    ///
    /// # Errors
    /// Returns error if the index exists but cannot be read
    fn load_index(&self) -> StoreResult<()>;

    /// Write buffered trees out
    ///
    /// # Errors
    /// Returns error if any buffered tree cannot be written
    fn flush(&self) -> StoreResult<()>;

    /// Persist the index of known trees
    ///
    /// # Errors
    /// Returns error if the index cannot be written
    fn save_index(&self) -> StoreResult<()>;

    /// Addresses of all snapshots
    ///
    /// # Errors
    /// Returns error if the snapshot listing cannot be read
    fn list_snapshots(&self) -> StoreResult<Vec<ContentHash>>;
}

impl<S: ObjectStore> ObjectStore for &S {
    fn load_tree(&self, id: &ContentHash) -> StoreResult<Tree> {
        (**self).load_tree(id)
    }

    fn save_tree(&self, tree: &Tree) -> StoreResult<ContentHash> {
        (**self).save_tree(tree)
    }

    fn load_snapshot(&self, id: &ContentHash) -> StoreResult<Snapshot> {
        (**self).load_snapshot(id)
    }

    fn save_unpacked<T: Serialize>(
        &self,
        kind: ObjectKind,
        value: &T,
    ) -> StoreResult<ContentHash> {
        (**self).save_unpacked(kind, value)
    }
}
