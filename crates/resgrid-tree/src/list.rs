//! Ordered container of resource tree nodes.
//!
//! A [`ResourceTreeList`] holds node handles, never nodes. It serves both as
//! the children collection inside a node and as a standalone collection of
//! candidate subtrees produced by a selection algorithm. Insertion order is
//! traversal order, and therefore allocation order.
//!
//! Dropping a list releases only the list itself; the nodes stay alive in
//! their forest. Tearing down every subtree a list names is
//! [`ResourceForest::destroy_list`](crate::ResourceForest::destroy_list).

use std::iter::Copied;
use std::slice;

use crate::error::{TreeError, TreeResult};
use crate::node::NodeId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTreeList {
    nodes: Vec<NodeId>,
}

impl ResourceTreeList {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create an empty list with room for `capacity` handles.
    pub fn try_with_capacity(capacity: usize) -> TreeResult<Self> {
        let mut nodes = Vec::new();
        nodes
            .try_reserve(capacity)
            .map_err(|_| TreeError::Exhausted)?;
        Ok(Self { nodes })
    }

    /// Append a node at the end of the list.
    pub fn append(&mut self, id: NodeId) -> TreeResult<()> {
        self.reserve_one()?;
        self.push(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    /// Independent, restartable traversal in insertion order.
    ///
    /// Any number of iterators may be live over the same list at once.
    pub fn iter(&self) -> Copied<slice::Iter<'_, NodeId>> {
        self.nodes.iter().copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Remove the first occurrence of `id`, keeping the order of the rest.
    /// Returns true if it was present.
    pub fn remove(&mut self, id: NodeId) -> bool {
        match self.nodes.iter().position(|&n| n == id) {
            Some(pos) => {
                self.nodes.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }

    pub(crate) fn reserve_one(&mut self) -> TreeResult<()> {
        self.nodes.try_reserve(1).map_err(|_| TreeError::Exhausted)
    }

    /// Push without growing; callers reserve first.
    pub(crate) fn push(&mut self, id: NodeId) {
        self.nodes.push(id);
    }
}

impl<'a> IntoIterator for &'a ResourceTreeList {
    type Item = NodeId;
    type IntoIter = Copied<slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for ResourceTreeList {
    type Item = NodeId;
    type IntoIter = std::vec::IntoIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl FromIterator<NodeId> for ResourceTreeList {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
