//! Virtual file system.
//!
//! An in-memory, never-touches-disk tree that the tool adapter mutates and the
//! transform pipeline reads through snapshots.
//!
//! - [`VirtualFs`] - The tree: create/read/update/delete/rename, persistence
//! - [`VfsSnapshot`] - Immutable copy of all files at one revision
//! - [`VfsEvent`] - Change notification delivered to observers
//!
//! ## Design Decisions
//!
//! - **Arena with parent ids**: nodes are owned by their directory's child
//!   map; the parent link is an id, used only to recompute paths.
//! - **Strict paths inside, lenient outside**: the tree accepts only
//!   normalized absolute paths; [`path::normalize`] is for callers at the
//!   edge.
//! - **Observers per instance**: one VFS per session, no global bus.

mod error;
mod events;
mod node;
pub mod path;
mod snapshot;
mod tree;

pub use error::{VfsError, VfsResult};
pub use events::{ChangeKind, Observer, SubscriptionId, VfsEvent};
pub use node::FileNode;
pub use snapshot::VfsSnapshot;
pub use tree::{SharedVfs, VirtualFs, shared_vfs};
