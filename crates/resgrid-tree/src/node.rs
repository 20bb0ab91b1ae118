//! Node handles and node records.

use std::fmt;
use std::sync::Arc;

use crate::list::ResourceTreeList;

/// Generational handle to a node in a [`ResourceForest`](crate::ResourceForest).
///
/// A handle keeps resolving only while the node it was issued for is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// One level of the hierarchy: a resource plus its sub-resources.
#[derive(Debug)]
pub struct ResourceTreeNode<R> {
    pub(crate) resource: Arc<R>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: ResourceTreeList,
}

impl<R> ResourceTreeNode<R> {
    pub fn resource(&self) -> &Arc<R> {
        &self.resource
    }

    /// Containing node, or `None` for a root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &ResourceTreeList {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
