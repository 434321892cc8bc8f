//! Query providers.
//!
//! A provider answers path queries against a built index. The transport
//! layer only sees the [`InfoProvider`] trait.
//!
//! ## Module Structure
//!
//! - `cache` - Bounded, time-limited cache of resolved paths
//! - `memory` - Provider backed by the in-memory tree

mod cache;
mod memory;

pub use cache::{PathCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
pub use memory::{MemProvider, MemProviderBuilder, ProviderStats};

use crate::error::Result;
use crate::summary::{InfoNode, InfoOptions};

/// Answers summarized path queries.
pub trait InfoProvider: Send + Sync {
    /// Returns the filtered summary of the subtree at `path`.
    ///
    /// `None` options mean the default query: the node's own summary.
    fn info_by_path(&self, path: &str, options: Option<&InfoOptions>) -> Result<InfoNode>;
}
