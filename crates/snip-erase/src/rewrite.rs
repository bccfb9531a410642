//! Copy-on-write tree rewriting
//!
//! [`TreeRewriter`] walks down a tree chain by name, drops the target entry
//! at the bottom and rebuilds every tree above it on the way back up. Each
//! rebuilt tree is saved before its parent is built, so the parent can
//! reference the child's new address. Trees off the path are not touched
//! and stay shared by address.

use crate::error::EraseError;
use crate::path::ErasePath;
use snip_object::{ContentHash, NodeKind, ObjectStore, Tree};
use tracing::{debug, info};

/// Removes one entry from a tree hierarchy
#[derive(Debug, Clone, Copy)]
pub struct TreeRewriter<'s, S> {
    store: &'s S,
}

impl<'s, S: ObjectStore> TreeRewriter<'s, S> {
    #[inline]
    #[must_use]
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Remove `path` below `root`, returning the new root address
    ///
    /// # Errors
    /// See [`rewrite`](Self::rewrite)
    pub fn erase(&self, root: &Tree, path: &ErasePath) -> Result<ContentHash, EraseError> {
        self.rewrite(root, path.components())
    }

    /// Remove the entry named by `remaining` below `tree`
    ///
    /// Saves exactly one new tree per component of `remaining`.
    ///
    /// # Errors
    /// - [`EraseError::EmptyPath`] if `remaining` is empty
    /// - [`EraseError::PathNotFound`] if a component has no matching node
    /// - [`EraseError::NotADirectory`] if a non-final component is not a directory
    /// - [`EraseError::Load`] / [`EraseError::Persist`] on store failures
    pub fn rewrite(&self, tree: &Tree, remaining: &[String]) -> Result<ContentHash, EraseError> {
        self.rewrite_at(tree, "", remaining)
    }

    fn rewrite_at(
        &self,
        tree: &Tree,
        prefix: &str,
        remaining: &[String],
    ) -> Result<ContentHash, EraseError> {
        let (name, rest) = remaining.split_first().ok_or(EraseError::EmptyPath)?;
        let item = join(prefix, name);

        let (index, node) = tree.find(name).ok_or_else(|| EraseError::PathNotFound {
            component: name.clone(),
            partial_path: item.clone(),
        })?;

        let rewritten = if rest.is_empty() {
            // Directories are dropped whole; their subtrees stay in the store.
            info!("erasing {} {:?}", node.kind, item);
            tree.without(index)
                .map_err(|e| EraseError::persist(format!("tree without {item:?}"), e))?
        } else {
            let subtree_id = match (node.kind, node.subtree()) {
                (NodeKind::Dir, Some(id)) => *id,
                (kind, _) => {
                    return Err(EraseError::NotADirectory {
                        path: item,
                        actual_kind: kind,
                    })
                }
            };

            debug!("descending into {:?} ({})", item, subtree_id.short());
            let subtree = self
                .store
                .load_tree(&subtree_id)
                .map_err(|e| EraseError::load(format!("subtree for {item:?}"), e))?;

            let new_subtree_id = self.rewrite_at(&subtree, &item, rest)?;
            tree.with_subtree(index, new_subtree_id)
                .map_err(|e| EraseError::persist(format!("tree above {item:?}"), e))?
        };

        let id = self
            .store
            .save_tree(&rewritten)
            .map_err(|e| EraseError::persist("new tree", e))?;
        info!(
            "saved tree {} for {:?}",
            id.short(),
            if prefix.is_empty() { "/" } else { prefix }
        );
        Ok(id)
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}
