//! The authoritative disk-usage tree.

use super::node_view::NodeView;
use super::resolve::SizeResolver;
use crate::storage::{Arena, IndexNode, NodeIndex};

/// Immutable hierarchy built once from a report.
///
/// Every node's `total_kb` is resolved when the tree is created; nothing
/// mutates the tree afterwards, so it can be shared freely between readers.
#[derive(Debug)]
pub struct DuTree {
    nodes: Arena<IndexNode>,
    root: NodeIndex,
    resolver: SizeResolver,
}

impl DuTree {
    /// Wraps a fully inserted arena and resolves every node's size.
    ///
    /// Children are always inserted after their parent, so walking the arena
    /// backwards visits every child before its parent.
    pub(crate) fn new(mut nodes: Arena<IndexNode>, root: NodeIndex, resolver: SizeResolver) -> Self {
        for i in (0..nodes.len()).rev() {
            let id = NodeIndex::new(i);
            let node = &nodes[id];
            let children_kb = (!node.is_leaf()).then(|| {
                node.children()
                    .iter()
                    .fold(0u64, |acc, &child| acc.saturating_add(nodes[child].total_kb))
            });
            let total = resolver.combine(node.reported_kb, children_kb);
            nodes[id].total_kb = total;
        }

        Self {
            nodes,
            root,
            resolver,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeIndex) -> Option<&IndexNode> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn resolver(&self) -> SizeResolver {
        self.resolver
    }

    /// Returns the number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Computes the full report path of a node by walking up the parent chain.
    pub fn full_path(&self, id: NodeIndex) -> Option<String> {
        NodeView::new(&self.nodes, id).compute_path()
    }

    /// Locates a node by path.
    ///
    /// The path is cleaned first (see [`normalize_query_path`]). A first
    /// segment equal to the root's own name designates the root, so both
    /// `./pytest` and `pytest` find the same node in a report rooted at `.`.
    pub fn lookup(&self, path: &str) -> Option<NodeIndex> {
        let root = self.nodes.get(self.root)?;
        let mut current = self.root;

        for (pos, segment) in clean_segments(path).into_iter().enumerate() {
            if pos == 0 && segment == root.name() {
                continue;
            }
            current = self.nodes.get(current)?.child(segment)?;
        }

        Some(current)
    }
}

/// Cleans a query path into its canonical form.
///
/// Empty and `.` segments are dropped and `..` removes the preceding
/// segment. The empty result is spelled `.`.
pub fn normalize_query_path(path: &str) -> String {
    let segments = clean_segments(path);
    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

fn clean_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    segments
}
