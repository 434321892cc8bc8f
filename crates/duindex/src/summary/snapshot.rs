//! Depth-bounded private clones of the authoritative tree.

use fnv::FnvHashMap;

use super::filter::PERCENT_SCALE;
use super::info::InfoNode;
use crate::index::{DuTree, NodeView, PathNode, SizeResolver};
use crate::storage::{Arena, NodeIndex};

/// Options for [`Snapshot::clone_from`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloneOptions {
    /// Build a name index on every cloned node. Only needed when the clone
    /// is looked up by name or composed further.
    pub with_child_index: bool,
}

/// A node of a [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotNode {
    name: String,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    child_names: Option<FnvHashMap<String, NodeIndex>>,
    /// Size from the report, `None` when unknown.
    pub reported_kb: Option<u64>,
    /// Resolved size, memoized by [`Snapshot::resolve_size`].
    pub size_kb: Option<u64>,
    pub modified: i64,
    pub percent_of_parent: u32,
    sorted: bool,
    synthetic: bool,
}

impl SnapshotNode {
    fn new(name: impl Into<String>, parent: Option<NodeIndex>, with_child_index: bool) -> Self {
        Self {
            name: name.into(),
            parent,
            children: Vec::new(),
            child_names: with_child_index.then(FnvHashMap::default),
            reported_kb: None,
            size_kb: None,
            modified: 0,
            percent_of_parent: 0,
            sorted: false,
            synthetic: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// True when `children` is in its final order for this pass.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// True for the aggregated `Others` bucket.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn has_child_index(&self) -> bool {
        self.child_names.is_some()
    }
}

impl PathNode for SnapshotNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }
}

/// A private, mutable copy of part of the authoritative tree.
///
/// Parent links point inside the snapshot. The authoritative path of the
/// cloned root's parent is kept so full paths stay absolute.
#[derive(Debug, Clone)]
pub struct Snapshot {
    nodes: Arena<SnapshotNode>,
    root: NodeIndex,
    base_path: Option<String>,
    resolver: SizeResolver,
    with_child_index: bool,
}

impl Snapshot {
    /// Creates a snapshot holding a single root node.
    pub fn with_root(
        name: impl Into<String>,
        reported_kb: Option<u64>,
        modified: i64,
        resolver: SizeResolver,
        options: CloneOptions,
    ) -> Self {
        let mut nodes = Arena::new();
        let mut node = SnapshotNode::new(name, None, options.with_child_index);
        node.reported_kb = reported_kb;
        node.modified = modified;
        node.percent_of_parent = PERCENT_SCALE;
        let root = nodes.insert(node);
        Self {
            nodes,
            root,
            base_path: None,
            resolver,
            with_child_index: options.with_child_index,
        }
    }

    /// Clones `id` and its descendants down to `depth` levels.
    ///
    /// Depth 0 copies the node alone. Cloned nodes carry the tree's resolved
    /// sizes, so a cut-off directory still reports its full size.
    pub fn clone_from(
        tree: &DuTree,
        id: NodeIndex,
        depth: usize,
        options: CloneOptions,
    ) -> Option<Self> {
        let source = tree.get(id)?;
        let mut snapshot = Self::with_root(
            source.name(),
            source.reported_kb,
            source.modified,
            tree.resolver(),
            options,
        );
        snapshot.nodes[snapshot.root].size_kb = Some(source.total_kb);
        snapshot.base_path = source.parent().and_then(|parent| tree.full_path(parent));

        let mut pending = vec![(id, snapshot.root, depth)];
        while let Some((src_id, dst_id, remaining)) = pending.pop() {
            if remaining == 0 {
                continue;
            }
            let Some(src) = tree.get(src_id) else {
                continue;
            };
            for &src_child in src.children() {
                let Some(child) = tree.get(src_child) else {
                    continue;
                };
                let dst_child = snapshot.attach(dst_id, child.name());
                let node = &mut snapshot.nodes[dst_child];
                node.reported_kb = child.reported_kb;
                node.size_kb = Some(child.total_kb);
                node.modified = child.modified;
                pending.push((src_child, dst_child, remaining - 1));
            }
        }

        Some(snapshot)
    }

    #[inline]
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeIndex) -> Option<&SnapshotNode> {
        self.nodes.get(id)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeIndex) -> &mut SnapshotNode {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeIndex) -> &[NodeIndex] {
        self.nodes.get(id).map(|n| n.children()).unwrap_or_default()
    }

    /// Looks up a direct child by name, through the name index when present.
    pub fn child(&self, id: NodeIndex, name: &str) -> Option<NodeIndex> {
        let node = self.nodes.get(id)?;
        match &node.child_names {
            Some(names) => names.get(name).copied(),
            None => node
                .children
                .iter()
                .copied()
                .find(|&c| self.nodes[c].name == name),
        }
    }

    /// Adds a child of unknown size, or returns the existing one with that name.
    pub fn add_child(&mut self, parent: NodeIndex, name: &str) -> NodeIndex {
        match self.child(parent, name) {
            Some(existing) => existing,
            None => self.attach(parent, name),
        }
    }

    /// Sets a node's reported size and forgets every memoized size on its
    /// ancestor chain.
    pub fn set_reported(&mut self, id: NodeIndex, reported_kb: Option<u64>) {
        self.nodes[id].reported_kb = reported_kb;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &mut self.nodes[node_id];
            node.size_kb = None;
            node.sorted = false;
            current = node.parent;
        }
    }

    fn attach(&mut self, parent: NodeIndex, name: &str) -> NodeIndex {
        let id = self
            .nodes
            .insert(SnapshotNode::new(name, Some(parent), self.with_child_index));
        let parent_node = &mut self.nodes[parent];
        parent_node.children.push(id);
        parent_node.sorted = false;
        if let Some(names) = parent_node.child_names.as_mut() {
            names.insert(name.to_string(), id);
        }
        id
    }

    /// Adds a childless synthetic node with a fixed size.
    pub(crate) fn push_synthetic(
        &mut self,
        parent: NodeIndex,
        name: &str,
        size_kb: u64,
        percent_of_parent: u32,
    ) -> NodeIndex {
        let mut node = SnapshotNode::new(name, Some(parent), self.with_child_index);
        node.size_kb = Some(size_kb);
        node.percent_of_parent = percent_of_parent;
        node.sorted = true;
        node.synthetic = true;
        self.nodes.insert(node)
    }

    /// Replaces a node's children with an already ordered set.
    pub(crate) fn replace_children(&mut self, id: NodeIndex, children: Vec<NodeIndex>) {
        let names = self.nodes[id].child_names.is_some().then(|| {
            let mut names = FnvHashMap::default();
            for &child in &children {
                names
                    .entry(self.nodes[child].name.clone())
                    .or_insert(child);
            }
            names
        });
        let node = &mut self.nodes[id];
        node.children = children;
        node.child_names = names;
        node.sorted = true;
    }

    /// Resolves a node's size, memoizing it on every node visited.
    pub fn resolve_size(&mut self, id: NodeIndex) -> u64 {
        if let Some(size) = self.nodes[id].size_kb {
            return size;
        }

        let children = self.nodes[id].children.clone();
        let children_kb = (!children.is_empty()).then(|| {
            children
                .iter()
                .fold(0u64, |acc, &child| acc.saturating_add(self.resolve_size(child)))
        });

        let size = self.resolver.combine(self.nodes[id].reported_kb, children_kb);
        self.nodes[id].size_kb = Some(size);
        size
    }

    /// Orders a node's children by size descending, ties by name ascending.
    ///
    /// Does nothing when the node is already sorted.
    pub fn sort_children(&mut self, id: NodeIndex) {
        if self.nodes[id].sorted {
            return;
        }

        let mut children = std::mem::take(&mut self.nodes[id].children);
        for &child in &children {
            self.resolve_size(child);
        }
        children.sort_by(|&a, &b| {
            let (a, b) = (&self.nodes[a], &self.nodes[b]);
            b.size_kb
                .cmp(&a.size_kb)
                .then_with(|| a.name.cmp(&b.name))
        });

        let node = &mut self.nodes[id];
        node.children = children;
        node.sorted = true;
    }

    /// Computes the full report path of a snapshot node.
    pub fn full_path(&self, id: NodeIndex) -> Option<String> {
        let local = NodeView::new(&self.nodes, id).compute_path()?;
        Some(match self.base_path.as_deref() {
            None => local,
            Some("/") => format!("/{local}"),
            Some(base) => format!("{base}/{local}"),
        })
    }

    /// Converts the subtree at `id` into a result tree.
    pub fn to_info(&self, id: NodeIndex) -> Option<InfoNode> {
        let node = self.nodes.get(id)?;
        let children = node
            .children
            .iter()
            .filter_map(|&child| self.to_info(child))
            .collect();

        Some(InfoNode {
            name: node.name.clone(),
            path: self.full_path(id)?,
            size_kb: node.size_kb.unwrap_or(self.resolver.min_block_kb),
            modified_timestamp: node.modified,
            percent_of_parent: node.percent_of_parent,
            synthetic: node.synthetic,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{build_tree, BuildOptions};
    use std::io::Cursor;

    fn tree(lines: &[(u64, &str)]) -> DuTree {
        let text: String = lines
            .iter()
            .map(|(size, path)| format!("{size}\t2023-04-08 12:03\t{path}\n"))
            .collect();
        build_tree(Cursor::new(text.into_bytes()), &BuildOptions::default())
            .unwrap()
            .0
    }

    fn sample() -> DuTree {
        tree(&[(100, "a/b/x"), (50, "a/b/y"), (10, "a/c/z"), (1, "a")])
    }

    #[test]
    fn depth_zero_clones_summary_only() {
        let tree = sample();
        let snapshot = Snapshot::clone_from(&tree, tree.root(), 0, CloneOptions::default()).unwrap();

        assert_eq!(snapshot.len(), 1);
        let root = snapshot.get(snapshot.root()).unwrap();
        assert_eq!(root.size_kb, Some(161));
        assert!(root.children().is_empty());
        assert_eq!(root.percent_of_parent, PERCENT_SCALE);
    }

    #[test]
    fn depth_bounds_the_copy_but_keeps_sizes() {
        let tree = sample();
        let snapshot = Snapshot::clone_from(&tree, tree.root(), 1, CloneOptions::default()).unwrap();

        assert_eq!(snapshot.len(), 3);
        let b = snapshot.child(snapshot.root(), "b").unwrap();
        let b_node = snapshot.get(b).unwrap();
        assert!(b_node.children().is_empty());
        assert_eq!(b_node.size_kb, Some(150));
        assert_eq!(b_node.parent(), Some(snapshot.root()));
    }

    #[test]
    fn clone_keeps_authoritative_order_and_builds_name_index() {
        let tree = sample();
        let options = CloneOptions {
            with_child_index: true,
        };
        let snapshot = Snapshot::clone_from(&tree, tree.root(), 5, options).unwrap();

        let names: Vec<_> = snapshot
            .children(snapshot.root())
            .iter()
            .map(|&c| snapshot.get(c).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["b", "c"]);

        let b = snapshot.child(snapshot.root(), "b").unwrap();
        assert!(snapshot.get(b).unwrap().has_child_index());
        assert!(snapshot.child(b, "x").is_some());
        assert_eq!(snapshot.len(), 6);
    }

    #[test]
    fn full_path_of_subtree_clone_is_absolute() {
        let tree = tree(&[(4, "./pytest/Dockerfile.base"), (8, "./pytest/lib/x.py")]);
        let pytest = tree.lookup("./pytest").unwrap();
        let snapshot = Snapshot::clone_from(&tree, pytest, 2, CloneOptions::default()).unwrap();

        let file = snapshot.child(snapshot.root(), "Dockerfile.base").unwrap();
        assert_eq!(
            snapshot.full_path(file).as_deref(),
            Some("./pytest/Dockerfile.base")
        );
        assert_eq!(snapshot.full_path(snapshot.root()).as_deref(), Some("./pytest"));
    }

    #[test]
    fn clone_never_touches_the_tree() {
        let tree = sample();
        let mut snapshot = Snapshot::clone_from(&tree, tree.root(), 3, CloneOptions::default()).unwrap();
        let b = snapshot.child(snapshot.root(), "b").unwrap();
        snapshot.set_reported(b, Some(9999));
        snapshot.resolve_size(snapshot.root());

        let b_tree = tree.get(tree.lookup("a/b").unwrap()).unwrap();
        assert_eq!(b_tree.reported_kb, None);
        assert_eq!(b_tree.total_kb, 150);
    }

    #[test]
    fn resolve_size_memoizes_composed_nodes() {
        let mut snapshot = Snapshot::with_root(
            ".",
            None,
            0,
            SizeResolver::default(),
            CloneOptions::default(),
        );
        let root = snapshot.root();
        let dir = snapshot.add_child(root, "dir");
        let f1 = snapshot.add_child(dir, "f1");
        snapshot.set_reported(f1, Some(30));
        let f2 = snapshot.add_child(dir, "f2");
        snapshot.set_reported(f2, Some(0));
        snapshot.add_child(root, "empty");

        assert_eq!(snapshot.resolve_size(root), 34);
        assert_eq!(snapshot.get(dir).unwrap().size_kb, Some(30));
        assert_eq!(snapshot.get(f2).unwrap().size_kb, Some(0));
        assert_eq!(snapshot.add_child(root, "dir"), dir);
    }

    #[test]
    fn sort_orders_by_size_then_name() {
        let tree = tree(&[(5, "./b"), (9, "./a"), (5, "./a2"), (12, "./z")]);
        let mut snapshot = Snapshot::clone_from(&tree, tree.root(), 1, CloneOptions::default()).unwrap();
        let root = snapshot.root();
        snapshot.sort_children(root);

        let names: Vec<_> = snapshot
            .children(root)
            .iter()
            .map(|&c| snapshot.get(c).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["z", "a", "a2", "b"]);
        assert!(snapshot.get(root).unwrap().is_sorted());
    }

    #[test]
    fn to_info_mirrors_snapshot() {
        let tree = sample();
        let snapshot = Snapshot::clone_from(&tree, tree.root(), 2, CloneOptions::default()).unwrap();
        let info = snapshot.to_info(snapshot.root()).unwrap();

        assert_eq!(info.name, "a");
        assert_eq!(info.path, "a");
        assert_eq!(info.size_kb, 161);
        let x = info.descendant(&["b", "x"]).unwrap();
        assert_eq!(x.size_kb, 100);
        assert_eq!(x.path, "a/b/x");
    }
}
