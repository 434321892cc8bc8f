//! Disk-usage tree construction and lookup.
//!
//! ## Architecture
//!
//! The index is built in two phases:
//! 1. **Insert phase** (`builder`): report records are attached to an arena
//!    tree one by one, creating missing intermediate directories on the way.
//! 2. **Resolve phase** (`resolve`): sizes are resolved bottom-up once, after
//!    which the tree is never mutated again.
//!
//! ## Module Structure
//!
//! - `builder` - Report ingestion, ignore list and build summary
//! - `node_view` - Full-path reconstruction through parent links
//! - `resolve` - Size resolution rules
//! - `tree` - The immutable authoritative tree and path lookup

mod builder;
mod node_view;
mod resolve;
mod tree;

pub use builder::{
    build_tree, build_tree_from_path, normalize_ignore, BuildOptions, BuildSummary, TreeBuilder,
};
pub use node_view::{NodeView, PathNode};
pub use resolve::{SizeResolver, DEFAULT_MIN_BLOCK_KB};
pub use tree::{normalize_query_path, DuTree};
