//! Storage layer for the disk-usage index.
//!
//! Nodes live in a flat, append-only arena addressed by compact integer
//! indices. Parent links are plain indices, so the tree has no ownership
//! cycles and can be shared read-only across threads once built.

mod arena;
mod index_types;
mod node;

pub use arena::Arena;
pub use index_types::NodeIndex;
pub use node::IndexNode;
