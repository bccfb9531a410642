//! Filesystem repository
//!
//! Layout under the repository root:
//!
//! ```text
//! data/<2 hex>/<64 hex>   tree objects, sharded by first byte
//! snapshots/<64 hex>      snapshot objects (written unpacked)
//! index.json              sorted list of tree addresses known to the repository
//! locks/exclusive         advisory lock file
//! ```
//!
//! New trees are buffered until [`Repository::flush`]; the index only lists
//! trees that reached disk and is persisted by [`Repository::save_index`].
//! Snapshots bypass the buffer and are written immediately.

use crate::error::{StoreError, StoreResult};
use crate::hash::ContentHash;
use crate::snapshot::Snapshot;
use crate::store::{ObjectKind, ObjectStore, Repository};
use crate::tree::Tree;
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const DATA_DIR: &str = "data";
const SNAPSHOT_DIR: &str = "snapshots";
const LOCK_DIR: &str = "locks";
const INDEX_FILE: &str = "index.json";

/// Repository stored in a local directory
#[derive(Debug)]
pub struct FsRepository {
    root: PathBuf,
    pending: Mutex<BTreeMap<ContentHash, Vec<u8>>>,
    index: RwLock<BTreeSet<ContentHash>>,
}

/// Exclusive lock on an [`FsRepository`], released on drop
#[derive(Debug)]
pub struct FsLock {
    file: File,
    path: PathBuf,
}

impl FsLock {
    /// Lock file backing this guard
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FsLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

impl FsRepository {
    /// Create the repository layout at `root`
    ///
    /// Existing layouts are left as they are.
    ///
    /// # Errors
    /// Returns error if directories or the empty index cannot be created
    pub fn init(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        for dir in [DATA_DIR, SNAPSHOT_DIR, LOCK_DIR] {
            let path = root.join(dir);
            fs::create_dir_all(&path).map_err(|e| StoreError::io(&path, e))?;
        }
        let repo = Self::at(root);
        if !repo.index_path().exists() {
            repo.save_index()?;
        }
        tracing::info!("initialized repository at {}", repo.root.display());
        Ok(repo)
    }

    /// Open an existing repository
    ///
    /// # Errors
    /// Returns [`StoreError::NotARepository`] if the layout is missing
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        if [DATA_DIR, SNAPSHOT_DIR, LOCK_DIR]
            .iter()
            .any(|dir| !root.join(dir).is_dir())
        {
            return Err(StoreError::NotARepository(root));
        }
        tracing::debug!("opened repository at {}", root.display());
        Ok(Self::at(root))
    }

    fn at(root: PathBuf) -> Self {
        Self {
            root,
            pending: Mutex::new(BTreeMap::new()),
            index: RwLock::new(BTreeSet::new()),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Trees saved but not yet flushed
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Tree addresses currently in the index
    #[must_use]
    pub fn indexed_trees(&self) -> Vec<ContentHash> {
        self.index.read().iter().copied().collect()
    }

    /// On-disk location of an object
    #[must_use]
    pub fn object_path(&self, kind: ObjectKind, id: &ContentHash) -> PathBuf {
        match kind {
            ObjectKind::Tree => self
                .root
                .join(DATA_DIR)
                .join(id.shard())
                .join(id.to_string()),
            ObjectKind::Snapshot => self.root.join(SNAPSHOT_DIR).join(id.to_string()),
        }
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// Read an object and check it still hashes to its address
    fn read_verified(&self, kind: ObjectKind, id: &ContentHash) -> StoreResult<Vec<u8>> {
        let path = self.object_path(kind, id);
        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound { kind, id: *id },
            _ => StoreError::io(&path, e),
        })?;
        let actual = ContentHash::compute(&bytes);
        if actual != *id {
            return Err(StoreError::Corrupt {
                kind,
                id: *id,
                reason: format!("content hashes to {}", actual.short()),
            });
        }
        Ok(bytes)
    }

    fn write_object(&self, kind: ObjectKind, id: &ContentHash, bytes: &[u8]) -> StoreResult<()> {
        let path = self.object_path(kind, id);
        if path.exists() {
            return Ok(());
        }
        write_atomic(&path, bytes)
    }
}

/// Write via a temp file in the target directory, then rename into place
fn write_atomic(target: &Path, bytes: &[u8]) -> StoreResult<()> {
    let parent = target
        .parent()
        .ok_or_else(|| StoreError::io(target, ErrorKind::InvalidInput.into()))?;
    fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

    let temp_path = parent.join(format!(".tmp-{}", std::process::id()));
    let written = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::io(&temp_path, e));
    }

    fs::rename(&temp_path, target).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StoreError::io(target, e)
    })
}

impl ObjectStore for FsRepository {
    fn load_tree(&self, id: &ContentHash) -> StoreResult<Tree> {
        if let Some(bytes) = self.pending.lock().get(id) {
            return Tree::decode(bytes);
        }
        let bytes = self.read_verified(ObjectKind::Tree, id)?;
        Tree::decode(&bytes)
    }

    fn save_tree(&self, tree: &Tree) -> StoreResult<ContentHash> {
        tree.validate()?;
        let bytes = tree.encode()?;
        let id = ContentHash::compute(&bytes);
        if self.index.read().contains(&id) {
            tracing::trace!("tree {} already indexed", id.short());
            return Ok(id);
        }
        self.pending.lock().entry(id).or_insert(bytes);
        Ok(id)
    }

    fn load_snapshot(&self, id: &ContentHash) -> StoreResult<Snapshot> {
        let bytes = self.read_verified(ObjectKind::Snapshot, id)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save_unpacked<T: Serialize>(
        &self,
        kind: ObjectKind,
        value: &T,
    ) -> StoreResult<ContentHash> {
        let bytes = serde_json::to_vec(value)?;
        let id = ContentHash::compute(&bytes);
        self.write_object(kind, &id, &bytes)?;
        tracing::debug!("saved unpacked {} {}", kind, id.short());
        Ok(id)
    }
}

impl Repository for FsRepository {
    type Lock = FsLock;

    fn lock_exclusive(&self) -> StoreResult<FsLock> {
        let path = self.root.join(LOCK_DIR).join("exclusive");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                tracing::debug!("acquired exclusive lock {}", path.display());
                Ok(FsLock { file, path })
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                Err(StoreError::Locked(self.root.clone()))
            }
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    fn load_index(&self) -> StoreResult<()> {
        let path = self.index_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        let ids: Vec<ContentHash> = serde_json::from_slice(&bytes)?;
        let mut index = self.index.write();
        index.extend(ids);
        tracing::debug!("loaded index with {} trees", index.len());
        Ok(())
    }

    fn flush(&self) -> StoreResult<()> {
        let mut pending = self.pending.lock();
        let count = pending.len();
        while let Some((id, bytes)) = pending.pop_first() {
            if let Err(e) = self.write_object(ObjectKind::Tree, &id, &bytes) {
                pending.insert(id, bytes);
                return Err(e);
            }
            self.index.write().insert(id);
        }
        if count > 0 {
            tracing::info!("flushed {} trees", count);
        }
        Ok(())
    }

    fn save_index(&self) -> StoreResult<()> {
        let ids: Vec<ContentHash> = self.index.read().iter().copied().collect();
        let bytes = serde_json::to_vec_pretty(&ids)?;
        write_atomic(&self.index_path(), &bytes)
    }

    fn list_snapshots(&self) -> StoreResult<Vec<ContentHash>> {
        let dir = self.root.join(SNAPSHOT_DIR);
        let entries = fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let name = entry.file_name();
            match name.to_str().map(str::parse::<ContentHash>) {
                Some(Ok(id)) => ids.push(id),
                _ => tracing::debug!("skipping {:?} in snapshot directory", name),
            }
        }
        ids.sort();
        Ok(ids)
    }
}
