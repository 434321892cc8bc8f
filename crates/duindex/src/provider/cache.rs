use std::time::Duration;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use crate::storage::NodeIndex;

pub const DEFAULT_CACHE_CAPACITY: u64 = 1000;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Maps normalized query paths to nodes of the authoritative tree.
///
/// Entries leave by least-recent use once `capacity` is reached, or once
/// they are older than `ttl`. The tree never changes after build, so there
/// is no invalidation.
#[derive(Debug, Clone)]
pub struct PathCache {
    cache: Cache<String, NodeIndex>,
}

impl PathCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let max_capacity = if capacity == 0 { 1 } else { capacity };
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { cache }
    }

    pub fn get(&self, path: &str) -> Option<NodeIndex> {
        self.cache.get(path)
    }

    pub fn insert(&self, path: impl Into<String>, node: NodeIndex) {
        self.cache.insert(path.into(), node);
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Applies pending evictions and expirations now.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}
