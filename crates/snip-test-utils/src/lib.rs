//! Testing utilities for the snip workspace
//!
//! Tree fixtures, a sample snapshot, and a store wrapper that fails on
//! demand.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc, clippy::must_use_candidate)]

use chrono::{TimeZone, Utc};
use serde::Serialize;
use snip_object::{
    ContentHash, Node, ObjectKind, ObjectStore, Repository, Snapshot, StoreError, StoreResult,
    Tree,
};
use std::io;

/// Fixture entry, nested for directories
#[derive(Debug, Clone)]
pub enum Entry {
    File(String),
    Dir(String, Vec<Entry>),
    Symlink(String),
}

pub fn file(name: &str) -> Entry {
    Entry::File(name.to_owned())
}

pub fn dir(name: &str, children: Vec<Entry>) -> Entry {
    Entry::Dir(name.to_owned(), children)
}

pub fn symlink(name: &str) -> Entry {
    Entry::Symlink(name.to_owned())
}

/// Save `entries` (and every nested directory) as trees, returning the root
pub fn build_tree<S: ObjectStore>(store: &S, entries: &[Entry]) -> ContentHash {
    let nodes = entries
        .iter()
        .map(|entry| match entry {
            Entry::File(name) => Node::file(name.as_str())
                .with_size(name.len() as u64)
                .with_content(vec![ContentHash::compute(name.as_bytes())]),
            Entry::Dir(name, children) => Node::dir(name.as_str(), build_tree(store, children)),
            Entry::Symlink(name) => Node::symlink(name.as_str()),
        })
        .collect();
    store.save_tree(&Tree::from_nodes(nodes)).unwrap()
}

/// Node names of a tree, in order
pub fn names(tree: &Tree) -> Vec<String> {
    tree.nodes().iter().map(|n| n.name.clone()).collect()
}

/// Walk `path` (slash separated) from `root`; `None` if any step is missing
pub fn lookup<S: ObjectStore>(store: &S, root: &ContentHash, path: &str) -> Option<Node> {
    let mut tree = store.load_tree(root).ok()?;
    let mut components = path.split('/').filter(|c| !c.is_empty()).peekable();
    while let Some(name) = components.next() {
        let (_, node) = tree.find(name)?;
        if components.peek().is_none() {
            return Some(node.clone());
        }
        let next = *node.subtree()?;
        tree = store.load_tree(&next).ok()?;
    }
    None
}

/// Snapshot of `tree` with every optional field populated
pub fn sample_snapshot(tree: ContentHash) -> Snapshot {
    Snapshot::new(
        vec!["/home".into(), "/etc".into()],
        "laptop",
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap(),
        tree,
    )
    .with_parent(ContentHash::compute(b"parent snapshot"))
    .with_tags(vec!["daily".into(), "home".into()])
    .with_excludes(vec!["*.tmp".into()])
}

/// Wraps a store and fails selected operations
#[derive(Debug)]
pub struct FailingStore<S> {
    inner: S,
    tree_saves: bool,
    unpacked_saves: bool,
    flush: bool,
}

impl<S> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            tree_saves: false,
            unpacked_saves: false,
            flush: false,
        }
    }

    pub fn fail_tree_saves(mut self) -> Self {
        self.tree_saves = true;
        self
    }

    pub fn fail_unpacked_saves(mut self) -> Self {
        self.unpacked_saves = true;
        self
    }

    pub fn fail_flush(mut self) -> Self {
        self.flush = true;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn injected(what: &str) -> StoreError {
    StoreError::io(what, io::Error::other("injected failure"))
}

impl<S: ObjectStore> ObjectStore for FailingStore<S> {
    fn load_tree(&self, id: &ContentHash) -> StoreResult<Tree> {
        self.inner.load_tree(id)
    }

    fn save_tree(&self, tree: &Tree) -> StoreResult<ContentHash> {
        if self.tree_saves {
            return Err(injected("tree"));
        }
        self.inner.save_tree(tree)
    }

    fn load_snapshot(&self, id: &ContentHash) -> StoreResult<Snapshot> {
        self.inner.load_snapshot(id)
    }

    fn save_unpacked<T: Serialize>(
        &self,
        kind: ObjectKind,
        value: &T,
    ) -> StoreResult<ContentHash> {
        if self.unpacked_saves {
            return Err(injected(kind.as_str()));
        }
        self.inner.save_unpacked(kind, value)
    }
}

impl<S: Repository> Repository for FailingStore<S> {
    type Lock = S::Lock;

    fn lock_exclusive(&self) -> StoreResult<Self::Lock> {
        self.inner.lock_exclusive()
    }

    fn load_index(&self) -> StoreResult<()> {
        self.inner.load_index()
    }

    fn flush(&self) -> StoreResult<()> {
        if self.flush {
            return Err(injected("flush"));
        }
        self.inner.flush()
    }

    fn save_index(&self) -> StoreResult<()> {
        self.inner.save_index()
    }

    fn list_snapshots(&self) -> StoreResult<Vec<ContentHash>> {
        self.inner.list_snapshots()
    }
}
