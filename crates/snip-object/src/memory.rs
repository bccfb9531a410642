//! In-memory repository
//!
//! Keeps encoded objects in maps, so every load hands out a fresh decoded
//! copy and nothing a caller does to a loaded value can reach the stored
//! object.

use crate::error::{StoreError, StoreResult};
use crate::hash::ContentHash;
use crate::snapshot::Snapshot;
use crate::store::{ObjectKind, ObjectStore, Repository};
use crate::tree::Tree;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Repository held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    trees: RwLock<HashMap<ContentHash, Vec<u8>>>,
    unpacked: RwLock<HashMap<(ObjectKind, ContentHash), Vec<u8>>>,
    tree_saves: AtomicUsize,
    locked: Arc<AtomicBool>,
}

/// Exclusive lock on a [`MemoryStore`], released on drop
#[derive(Debug)]
pub struct MemoryLock {
    flag: Arc<AtomicBool>,
}

impl Drop for MemoryLock {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct trees stored
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.read().len()
    }

    /// Number of distinct snapshots stored
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.unpacked
            .read()
            .keys()
            .filter(|(kind, _)| *kind == ObjectKind::Snapshot)
            .count()
    }

    /// Number of `save_tree` calls, including ones that deduplicated
    #[must_use]
    pub fn tree_saves(&self) -> usize {
        self.tree_saves.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn contains_tree(&self, id: &ContentHash) -> bool {
        self.trees.read().contains_key(id)
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Store a snapshot, returning its address
    ///
    /// # Errors
    /// Returns error if the snapshot cannot be encoded
    pub fn insert_snapshot(&self, snapshot: &Snapshot) -> StoreResult<ContentHash> {
        self.save_unpacked(ObjectKind::Snapshot, snapshot)
    }
}

impl ObjectStore for MemoryStore {
    fn load_tree(&self, id: &ContentHash) -> StoreResult<Tree> {
        let trees = self.trees.read();
        let bytes = trees.get(id).ok_or(StoreError::NotFound {
            kind: ObjectKind::Tree,
            id: *id,
        })?;
        Tree::decode(bytes)
    }

    fn save_tree(&self, tree: &Tree) -> StoreResult<ContentHash> {
        tree.validate()?;
        let bytes = tree.encode()?;
        let id = ContentHash::compute(&bytes);
        self.tree_saves.fetch_add(1, Ordering::Relaxed);
        self.trees.write().entry(id).or_insert(bytes);
        Ok(id)
    }

    fn load_snapshot(&self, id: &ContentHash) -> StoreResult<Snapshot> {
        let unpacked = self.unpacked.read();
        let bytes = unpacked
            .get(&(ObjectKind::Snapshot, *id))
            .ok_or(StoreError::NotFound {
                kind: ObjectKind::Snapshot,
                id: *id,
            })?;
        Ok(serde_json::from_slice(bytes)?)
    }

    fn save_unpacked<T: Serialize>(
        &self,
        kind: ObjectKind,
        value: &T,
    ) -> StoreResult<ContentHash> {
        let bytes = serde_json::to_vec(value)?;
        let id = ContentHash::compute(&bytes);
        self.unpacked.write().entry((kind, id)).or_insert(bytes);
        Ok(id)
    }
}

impl Repository for MemoryStore {
    type Lock = MemoryLock;

    fn lock_exclusive(&self) -> StoreResult<MemoryLock> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(StoreError::Locked(PathBuf::from("<memory>")));
        }
        Ok(MemoryLock {
            flag: Arc::clone(&self.locked),
        })
    }

    fn load_index(&self) -> StoreResult<()> {
        Ok(())
    }

    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }

    fn save_index(&self) -> StoreResult<()> {
        Ok(())
    }

    fn list_snapshots(&self) -> StoreResult<Vec<ContentHash>> {
        let mut ids: Vec<_> = self
            .unpacked
            .read()
            .keys()
            .filter(|(kind, _)| *kind == ObjectKind::Snapshot)
            .map(|(_, id)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
