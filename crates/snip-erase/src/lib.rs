//! Path erasure for snip snapshots
//!
//! Removes one file or directory from a snapshot by writing a new snapshot
//! whose root tree lacks it. The original snapshot and every tree it
//! references are left in place.
//!
//! # Core Concepts
//!
//! - [`ErasePath`]: non-empty component list naming the entry to remove
//! - [`TreeRewriter`]: copy-on-write removal, saving one tree per level
//! - [`SnapshotForge`]: copy of a snapshot pointing at a new root
//! - [`SnapshotSelector`]: id prefix or `latest` with a [`SnapshotFilter`]
//! - [`erase`]: the locked end-to-end operation
//!
//! # Example
//!
//! ```rust,ignore
//! use snip_erase::{erase, EraseOptions, SnapshotFilter, SnapshotSelector};
//!
//! let options = EraseOptions::new(
//!     "home/user/.ssh/id_rsa",
//!     SnapshotSelector::Latest(SnapshotFilter::new().with_host("laptop")),
//! );
//! let outcome = erase(&repo, &options)?;
//! println!("new snapshot {}", outcome.snapshot);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod erase;
mod error;
mod forge;
mod path;
mod rewrite;
mod select;

pub use erase::{erase, EraseOptions, EraseOutcome};
pub use error::{EraseError, SelectorError, EXIT_FAILURE, EXIT_SELECTOR};
pub use forge::SnapshotForge;
pub use path::ErasePath;
pub use rewrite::TreeRewriter;
pub use select::{SnapshotFilter, SnapshotSelector, TagList};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
