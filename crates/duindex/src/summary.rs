//! Query-time summaries of the authoritative tree.
//!
//! A query never touches the authoritative tree beyond reading it: the
//! requested subtree is cloned into a private [`Snapshot`], the snapshot is
//! sorted and truncated in place, and the result is converted to
//! [`InfoNode`]s for the caller.
//!
//! ## Module Structure
//!
//! - `filter` - Long-tail truncation with the synthetic `Others` bucket
//! - `info` - Query options and the serializable result tree
//! - `snapshot` - Depth-bounded clones with their own size resolution and sorting

mod filter;
mod info;
mod snapshot;

pub use filter::{filter_long_tail, percent_of, OTHERS_NAME, PERCENT_SCALE};
pub use info::{InfoNode, InfoOptions};
pub use snapshot::{CloneOptions, Snapshot, SnapshotNode};
