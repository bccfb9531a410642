//! The erase operation
//!
//! Runs the whole removal under the repository's exclusive lock: resolve the
//! snapshot, rewrite its tree, persist the new trees and index, then forge
//! the replacement snapshot. The original snapshot is never modified or
//! removed.

use crate::error::EraseError;
use crate::forge::SnapshotForge;
use crate::path::ErasePath;
use crate::rewrite::TreeRewriter;
use crate::select::SnapshotSelector;
use snip_object::{ContentHash, Repository};
use tracing::{debug, info};

/// What to erase, and from which snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraseOptions {
    pub path: String,
    pub selector: SnapshotSelector,
}

impl EraseOptions {
    #[must_use]
    pub fn new(path: impl Into<String>, selector: SnapshotSelector) -> Self {
        Self {
            path: path.into(),
            selector,
        }
    }
}

/// Addresses produced by a successful erase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseOutcome {
    /// Snapshot that was erased from (still present)
    pub original: ContentHash,
    /// Newly forged snapshot
    pub snapshot: ContentHash,
    /// Root tree of the new snapshot
    pub tree: ContentHash,
}

/// Remove `options.path` from the selected snapshot
///
/// Produces a new snapshot identical to the selected one except for its
/// root tree. Nothing new is written if the path cannot be walked.
///
/// # Errors
/// - [`EraseError::EmptyPath`] if the path has no components
/// - [`EraseError::Lock`] if the repository is locked elsewhere
/// - [`EraseError::SelectorResolution`] if the snapshot cannot be selected
/// - [`EraseError::PathNotFound`] / [`EraseError::NotADirectory`] if the
///   path does not lead to an entry
/// - [`EraseError::Load`] / [`EraseError::Persist`] on store failures
pub fn erase<R: Repository>(repo: &R, options: &EraseOptions) -> Result<EraseOutcome, EraseError> {
    let path = ErasePath::parse(&options.path)?;

    let _lock = repo.lock_exclusive().map_err(EraseError::Lock)?;
    debug!("acquired exclusive lock");

    repo.load_index().map_err(|e| EraseError::load("index", e))?;

    let original = options.selector.resolve(repo)?;
    let snapshot = repo
        .load_snapshot(&original)
        .map_err(|e| EraseError::load(format!("snapshot {}", original.short()), e))?;
    let root = repo
        .load_tree(&snapshot.tree)
        .map_err(|e| EraseError::load(format!("tree {}", snapshot.tree.short()), e))?;

    info!("erasing {:?} from snapshot {}", path.to_string(), original.short());
    let tree = TreeRewriter::new(repo).erase(&root, &path)?;

    repo.flush().map_err(|e| EraseError::persist("pending trees", e))?;
    repo.save_index().map_err(|e| EraseError::persist("index", e))?;

    let forged = SnapshotForge::new(repo).forge(&snapshot, tree)?;
    info!("new snapshot {}", forged.short());

    Ok(EraseOutcome {
        original,
        snapshot: forged,
        tree,
    })
}
