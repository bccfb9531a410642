//! Trees and nodes
//!
//! A [`Tree`] is one directory level: an ordered list of [`Node`]s. Trees are
//! identified by the blake3 hash of their JSON encoding, so any change to a
//! node produces a different tree with a different address. Trees are never
//! edited in place; [`Tree::without`] and [`Tree::with_subtree`] build new
//! values and leave the receiver untouched.

use crate::error::{StoreError, StoreResult};
use crate::hash::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Type of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Dir,
    Symlink,
    Other,
}

impl NodeKind {
    /// Lowercase name as stored in tree objects
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
            Self::Symlink => "symlink",
            Self::Other => "other",
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry of a tree
///
/// `subtree` is present exactly when `kind` is [`NodeKind::Dir`]. The
/// constructors uphold this; [`Tree::validate`] checks it for trees read
/// back from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subtree: Option<ContentHash>,
}

impl Node {
    fn bare(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            mode: None,
            size: None,
            content: Vec::new(),
            subtree: None,
        }
    }

    /// Regular file node
    #[must_use]
    pub fn file(name: impl Into<String>) -> Self {
        Self::bare(name, NodeKind::File)
    }

    /// Directory node referencing a child tree
    #[must_use]
    pub fn dir(name: impl Into<String>, subtree: ContentHash) -> Self {
        Self {
            subtree: Some(subtree),
            ..Self::bare(name, NodeKind::Dir)
        }
    }

    /// Symbolic link node
    #[must_use]
    pub fn symlink(name: impl Into<String>) -> Self {
        Self::bare(name, NodeKind::Symlink)
    }

    /// Device, fifo, socket or anything else
    #[must_use]
    pub fn other(name: impl Into<String>) -> Self {
        Self::bare(name, NodeKind::Other)
    }

    /// With file size
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// With permission bits
    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// With content blob addresses
    #[must_use]
    pub fn with_content(mut self, content: Vec<ContentHash>) -> Self {
        self.content = content;
        self
    }

    /// Child tree address (directories only)
    #[inline]
    #[must_use]
    pub fn subtree(&self) -> Option<&ContentHash> {
        self.subtree.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Dir
    }

    /// Same node pointing at another child tree
    ///
    /// Returns `None` for non-directories.
    #[must_use]
    pub fn retarget(&self, subtree: ContentHash) -> Option<Self> {
        if !self.is_dir() {
            return None;
        }
        Some(Self {
            subtree: Some(subtree),
            ..self.clone()
        })
    }
}

/// One directory level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Empty tree
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree from nodes, keeping their order
    #[must_use]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node, returning the grown tree
    #[must_use]
    pub fn push(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Position and value of the first node called `name`
    ///
    /// Names are not required to be unique; the first match wins.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<(usize, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, node)| node.name == name)
    }

    /// New tree with the node at `index` dropped
    ///
    /// Remaining nodes keep their relative order.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidTree`] if `index` is out of bounds
    pub fn without(&self, index: usize) -> StoreResult<Self> {
        if index >= self.nodes.len() {
            return Err(StoreError::InvalidTree(format!(
                "no node at position {index} of {}",
                self.nodes.len()
            )));
        }
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, node)| node.clone())
            .collect();
        Ok(Self { nodes })
    }

    /// New tree with the directory at `index` pointing to `subtree`
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidTree`] if `index` is out of bounds or the
    /// node there is not a directory
    pub fn with_subtree(&self, index: usize, subtree: ContentHash) -> StoreResult<Self> {
        let replaced = self
            .nodes
            .get(index)
            .and_then(|node| node.retarget(subtree))
            .ok_or_else(|| {
                StoreError::InvalidTree(format!("no directory node at position {index}"))
            })?;
        let mut nodes = self.nodes.clone();
        nodes[index] = replaced;
        Ok(Self { nodes })
    }

    /// Check the kind/subtree invariant on every node
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidTree`] naming the first offending node
    pub fn validate(&self) -> StoreResult<()> {
        for node in &self.nodes {
            match (node.kind, node.subtree.is_some()) {
                (NodeKind::Dir, false) => {
                    return Err(StoreError::InvalidTree(format!(
                        "directory {:?} has no subtree",
                        node.name
                    )));
                }
                (kind, true) if kind != NodeKind::Dir => {
                    return Err(StoreError::InvalidTree(format!(
                        "{kind} {:?} carries a subtree",
                        node.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Canonical encoding that the address is computed from
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode and validate a stored tree
    ///
    /// # Errors
    /// Returns error if the bytes are not a valid tree
    pub fn decode(bytes: &[u8]) -> StoreResult<Self> {
        let tree: Self = serde_json::from_slice(bytes)?;
        tree.validate()?;
        Ok(tree)
    }

    /// Content address of this tree
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn id(&self) -> StoreResult<ContentHash> {
        Ok(ContentHash::compute(&self.encode()?))
    }
}
