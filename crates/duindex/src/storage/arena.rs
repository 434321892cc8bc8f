//! Append-only arena with `NodeIndex` addressing.

use std::ops::{Index, IndexMut};

use super::index_types::NodeIndex;

/// A `Vec`-backed store that hands out [`NodeIndex`] handles.
///
/// Entries are never removed, so every index handed out stays valid for the
/// arena's lifetime.
#[derive(Debug, Clone)]
pub struct Arena<T>(Vec<T>);

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Inserts a value, returning its index.
    pub fn insert(&mut self, value: T) -> NodeIndex {
        let index = NodeIndex::new(self.0.len());
        self.0.push(value);
        index
    }

    /// Gets a reference to the value at `index`.
    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&T> {
        self.0.get(index.get())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Index<NodeIndex> for Arena<T> {
    type Output = T;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.0[index.get()]
    }
}

impl<T> IndexMut<NodeIndex> for Arena<T> {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.0[index.get()]
    }
}
