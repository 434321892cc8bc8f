//! Node view helpers for computing derived properties from arena nodes.
//!
//! Paths are not stored; they are rebuilt on demand by walking
//! the parent chain, for the authoritative tree and snapshots alike.

use crate::storage::{Arena, IndexNode, NodeIndex};

/// A node that knows its name and its parent's index.
pub trait PathNode {
    fn name(&self) -> &str;
    fn parent(&self) -> Option<NodeIndex>;
}

impl PathNode for IndexNode {
    fn name(&self) -> &str {
        IndexNode::name(self)
    }

    fn parent(&self) -> Option<NodeIndex> {
        IndexNode::parent(self)
    }
}

/// A view into a node that can compute derived properties.
pub struct NodeView<'a, T> {
    arena: &'a Arena<T>,
    index: NodeIndex,
}

impl<'a, T: PathNode> NodeView<'a, T> {
    #[inline]
    pub fn new(arena: &'a Arena<T>, index: NodeIndex) -> Self {
        Self { arena, index }
    }

    /// Returns the names from the top of the chain down to this node.
    pub fn segments(&self) -> Option<Vec<&'a str>> {
        let mut segments = Vec::new();
        let mut current = self.index;

        loop {
            let node = self.arena.get(current)?;
            segments.push(node.name());

            match node.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        segments.reverse();
        Some(segments)
    }

    /// Computes the full path by walking up the parent chain.
    ///
    /// Names are joined with `/` in root-to-leaf order, so a root named `.`
    /// yields `./dir/file` and an unnamed root yields `/dir/file`.
    pub fn compute_path(&self) -> Option<String> {
        let segments = self.segments()?;
        if segments == [""] {
            return Some("/".to_string());
        }
        Some(segments.join("/"))
    }
}
