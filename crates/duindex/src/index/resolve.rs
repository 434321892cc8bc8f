//! Size resolution rules shared by the authoritative tree and snapshots.

/// Smallest allocation unit reported for a path whose size is unknown.
pub const DEFAULT_MIN_BLOCK_KB: u64 = 4;

/// Combines a node's reported size with its children's resolved sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeResolver {
    pub min_block_kb: u64,
}

impl Default for SizeResolver {
    fn default() -> Self {
        Self {
            min_block_kb: DEFAULT_MIN_BLOCK_KB,
        }
    }
}

impl SizeResolver {
    pub fn new(min_block_kb: u64) -> Self {
        Self { min_block_kb }
    }

    /// Resolves one node.
    ///
    /// `children_kb` is `None` for a leaf and the sum of the children's
    /// resolved sizes otherwise.
    ///
    /// - A reported leaf keeps its reported size, zero included.
    /// - An unreported node takes the sum of its children, or the minimum
    ///   block when there is nothing to sum.
    /// - A reported directory keeps its size when it covers its children.
    ///   A smaller figure can only be the directory's own usage, so the
    ///   children are added on top of it.
    pub fn combine(&self, reported_kb: Option<u64>, children_kb: Option<u64>) -> u64 {
        match (reported_kb, children_kb) {
            (Some(reported), None) => reported,
            (Some(reported), Some(children)) if reported >= children => reported,
            (Some(reported), Some(children)) => reported.saturating_add(children),
            (None, Some(children)) if children > 0 => children,
            (None, _) => self.min_block_kb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_leaf_keeps_its_size() {
        let resolver = SizeResolver::default();
        assert_eq!(resolver.combine(Some(100), None), 100);
        assert_eq!(resolver.combine(Some(0), None), 0);
    }

    #[test]
    fn unknown_size_sums_children() {
        let resolver = SizeResolver::default();
        assert_eq!(resolver.combine(None, Some(150)), 150);
    }

    #[test]
    fn unknown_empty_node_gets_min_block() {
        let resolver = SizeResolver::new(8);
        assert_eq!(resolver.combine(None, None), 8);
        assert_eq!(resolver.combine(None, Some(0)), 8);
    }

    #[test]
    fn reported_directory_covering_children_wins() {
        let resolver = SizeResolver::default();
        assert_eq!(resolver.combine(Some(8268), Some(8160)), 8268);
    }

    #[test]
    fn reported_directory_below_children_is_own_usage() {
        let resolver = SizeResolver::default();
        assert_eq!(resolver.combine(Some(1), Some(160)), 161);
    }
}
