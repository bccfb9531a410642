//! snip object model
//!
//! Immutable, content-addressed trees and snapshots, and the stores that
//! hold them.
//!
//! # Core Concepts
//!
//! - [`ContentHash`]: 32-byte blake3 address of a serialized object
//! - [`Tree`] / [`Node`]: one directory level and its entries
//! - [`Snapshot`]: root tree address plus point-in-time metadata
//! - [`ObjectStore`] / [`Repository`]: load/save by address, and the
//!   lock/index/flush lifecycle around it
//! - [`MemoryStore`], [`FsRepository`]: the two store adapters
//!
//! # Example
//!
//! ```rust,ignore
//! use snip_object::{MemoryStore, Node, ObjectStore, Tree};
//!
//! let store = MemoryStore::new();
//! let id = store.save_tree(&Tree::new().push(Node::file("notes.txt")))?;
//! assert_eq!(store.load_tree(&id)?.len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod fs;
mod hash;
mod memory;
mod snapshot;
mod store;
mod tree;

pub use error::{StoreError, StoreResult};
pub use fs::{FsLock, FsRepository};
pub use hash::{ContentHash, HashError, HEX_LEN};
pub use memory::{MemoryLock, MemoryStore};
pub use snapshot::Snapshot;
pub use store::{ObjectKind, ObjectStore, Repository};
pub use tree::{Node, NodeKind, Tree};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
