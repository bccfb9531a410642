//! New snapshots for rewritten trees

use crate::error::EraseError;
use snip_object::{ContentHash, ObjectKind, ObjectStore, Snapshot};
use tracing::info;

/// Persists a copy of a snapshot pointing at a different root tree
#[derive(Debug, Clone, Copy)]
pub struct SnapshotForge<'s, S> {
    store: &'s S,
}

impl<'s, S: ObjectStore> SnapshotForge<'s, S> {
    #[inline]
    #[must_use]
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Copy of `original` whose root is `new_root`
    ///
    /// Every metadata field is carried over unchanged.
    #[must_use]
    pub fn build(original: &Snapshot, new_root: ContentHash) -> Snapshot {
        Snapshot {
            time: original.time,
            parent: original.parent,
            tree: new_root,
            paths: original.paths.clone(),
            hostname: original.hostname.clone(),
            tags: original.tags.clone(),
            excludes: original.excludes.clone(),
        }
    }

    /// Save the copy as an unpacked snapshot object, returning its address
    ///
    /// # Errors
    /// Returns [`EraseError::Persist`] if the store write fails
    pub fn forge(&self, original: &Snapshot, new_root: ContentHash) -> Result<ContentHash, EraseError> {
        let forged = Self::build(original, new_root);
        let id = self
            .store
            .save_unpacked(ObjectKind::Snapshot, &forged)
            .map_err(|e| EraseError::persist("snapshot", e))?;
        info!("saved snapshot {} with tree {}", id.short(), new_root.short());
        Ok(id)
    }
}
