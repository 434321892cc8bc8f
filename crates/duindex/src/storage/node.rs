//! Authoritative index node.

use fnv::FnvHashMap;
use thin_vec::ThinVec;

use super::index_types::NodeIndex;

/// One path of the report in the authoritative tree.
///
/// `children` keeps insertion order; `child_names` mirrors it for O(1)
/// lookup by name. Both are only changed through [`IndexNode::attach_child`].
#[derive(Debug, Clone, Default)]
pub struct IndexNode {
    name: String,
    /// Set once at creation; `None` only for the root.
    parent: Option<NodeIndex>,
    children: ThinVec<NodeIndex>,
    child_names: FnvHashMap<String, NodeIndex>,
    /// Size from the report; `None` when the path was never reported itself.
    pub reported_kb: Option<u64>,
    /// Resolved size, filled in once when the build finishes.
    pub total_kb: u64,
    /// Modification time as Unix timestamp (seconds).
    pub modified: i64,
}

impl IndexNode {
    /// Creates an unreported node attached under `parent`.
    pub fn new(name: impl Into<String>, parent: Option<NodeIndex>) -> Self {
        Self {
            name: name.into(),
            parent,
            ..Self::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the node. Only the root is ever renamed, before it has a parent map entry.
    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        debug_assert!(self.parent.is_none(), "only the root may be renamed");
        self.name = name.into();
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Looks up a direct child by name.
    #[inline]
    pub fn child(&self, name: &str) -> Option<NodeIndex> {
        self.child_names.get(name).copied()
    }

    /// Records `child` under `name`.
    ///
    /// Returns false without changing anything when the name is taken.
    pub(crate) fn attach_child(&mut self, name: &str, child: NodeIndex) -> bool {
        if self.child_names.contains_key(name) {
            return false;
        }
        self.child_names.insert(name.to_string(), child);
        self.children.push(child);
        true
    }

    /// Stores a record's size and time on this node.
    pub(crate) fn apply_report(&mut self, size_kb: u64, modified: i64) {
        self.reported_kb = Some(size_kb);
        self.modified = modified;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_child_keeps_name_index_in_sync() {
        let mut node = IndexNode::new("dir", None);
        assert!(node.attach_child("a", NodeIndex::new(1)));
        assert!(node.attach_child("b", NodeIndex::new(2)));
        assert!(!node.attach_child("a", NodeIndex::new(3)));

        assert_eq!(node.children(), &[NodeIndex::new(1), NodeIndex::new(2)]);
        assert_eq!(node.child("a"), Some(NodeIndex::new(1)));
        assert_eq!(node.child("c"), None);
        assert!(!node.is_leaf());
    }

    #[test]
    fn new_node_is_unreported() {
        let node = IndexNode::new("x", Some(NodeIndex::new(0)));
        assert_eq!(node.reported_kb, None);
        assert_eq!(node.parent(), Some(NodeIndex::new(0)));
        assert!(node.is_leaf());
    }

    #[test]
    fn apply_report_records_zero_as_known() {
        let mut node = IndexNode::new("empty", None);
        node.apply_report(0, 1_700_000_000);
        assert_eq!(node.reported_kb, Some(0));
        assert_eq!(node.modified, 1_700_000_000);
    }
}
