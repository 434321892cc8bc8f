use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::cache::{PathCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use super::InfoProvider;
use crate::error::{IndexError, Result};
use crate::index::{build_tree, normalize_query_path, BuildOptions, BuildSummary, DuTree};
use crate::storage::NodeIndex;
use crate::summary::{filter_long_tail, CloneOptions, InfoNode, InfoOptions, Snapshot};

/// Query counters.
#[derive(Debug, Default)]
pub struct ProviderStats {
    queries: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl ProviderStats {
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Default queries answered from the path cache.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Default queries that had to walk the tree.
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }
}

/// Provider over a tree held in memory.
#[derive(Debug)]
pub struct MemProvider {
    tree: Arc<DuTree>,
    cache: PathCache,
    summary: BuildSummary,
    stats: ProviderStats,
}

impl MemProvider {
    pub fn new(tree: impl Into<Arc<DuTree>>, cache: PathCache) -> Self {
        Self {
            tree: tree.into(),
            cache,
            summary: BuildSummary::default(),
            stats: ProviderStats::default(),
        }
    }

    pub fn tree(&self) -> &Arc<DuTree> {
        &self.tree
    }

    pub fn stats(&self) -> &ProviderStats {
        &self.stats
    }

    /// Counters of the build that produced the tree.
    pub fn build_summary(&self) -> BuildSummary {
        self.summary
    }

    fn lookup(&self, path: &str) -> Result<NodeIndex> {
        self.tree
            .lookup(path)
            .ok_or_else(|| IndexError::PathNotFound(path.to_string()))
    }

    fn lookup_cached(&self, path: &str) -> Result<NodeIndex> {
        let key = normalize_query_path(path);
        if let Some(id) = self.cache.get(&key) {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            log::debug!("path cache hit for {}", key);
            return Ok(id);
        }

        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);
        let id = self.lookup(path)?;
        self.cache.insert(key, id);
        Ok(id)
    }
}

impl InfoProvider for MemProvider {
    fn info_by_path(&self, path: &str, options: Option<&InfoOptions>) -> Result<InfoNode> {
        let options = options.copied().unwrap_or_default();
        options.validate()?;
        self.stats.queries.fetch_add(1, Ordering::Relaxed);

        let id = if options.is_default() {
            self.lookup_cached(path)?
        } else {
            self.lookup(path)?
        };

        let mut snapshot = Snapshot::clone_from(&self.tree, id, options.deep, CloneOptions::default())
            .ok_or_else(|| IndexError::PathNotFound(path.to_string()))?;
        let root = snapshot.root();
        filter_long_tail(&mut snapshot, root, &options)?;
        snapshot
            .to_info(root)
            .ok_or_else(|| IndexError::PathNotFound(path.to_string()))
    }
}

/// Builds a [`MemProvider`] from a report.
pub struct MemProviderBuilder<R> {
    reader: R,
    options: BuildOptions,
    cache_capacity: u64,
    cache_ttl: Duration,
}

impl MemProviderBuilder<BufReader<File>> {
    /// Opens the report now; a missing file fails here rather than in `build`.
    pub fn from_report_file(path: impl AsRef<Path>, options: BuildOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::from_reader(BufReader::new(file), options))
    }
}

impl<R: BufRead> MemProviderBuilder<R> {
    pub fn from_reader(reader: R, options: BuildOptions) -> Self {
        Self {
            reader,
            options,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Reads the whole report and returns the ready provider.
    pub fn build(self) -> Result<MemProvider> {
        let (tree, summary) = build_tree(self.reader, &self.options)?;
        let mut provider = MemProvider::new(tree, PathCache::new(self.cache_capacity, self.cache_ttl));
        provider.summary = summary;
        Ok(provider)
    }
}
