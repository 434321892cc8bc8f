//! Disk-usage index library.
//!
//! This crate turns a flat `du` report into a queryable hierarchy:
//! - Line parsing of `size\tmtime\tpath` records
//! - Arena-backed tree construction with bottom-up size resolution
//! - Depth-bounded snapshots filtered to a top-N view with a long-tail bucket
//! - An in-memory provider with a bounded, time-limited path cache

pub mod error;
pub mod index;
pub mod provider;
pub mod report;
pub mod storage;
pub mod summary;

// Re-export main types
pub use error::{IndexError, LineError, Result};
pub use index::{build_tree, BuildOptions, BuildSummary, DuTree, SizeResolver, TreeBuilder};
pub use provider::{InfoProvider, MemProvider, MemProviderBuilder, PathCache, ProviderStats};
pub use report::{parse_bytes, parse_line, ReportLine, ReportLines};
pub use storage::{Arena, IndexNode, NodeIndex};
pub use summary::{filter_long_tail, CloneOptions, InfoNode, InfoOptions, Snapshot, OTHERS_NAME};
