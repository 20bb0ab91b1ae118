//! Recursive allocate / reserve / release.
//!
//! All three share one shape: apply the operation to the node's own
//! resource, then recurse into each child in list order, stopping at the
//! first failure. Nothing is rolled back. Whatever was committed before the
//! failing node (the node itself, earlier siblings and their subtrees)
//! stays committed, and the caller decides whether to release it.

use resgrid_resrc::{JobId, Resource, ResourceResult};
use tracing::{debug, warn};

use crate::error::{TreeError, TreeResult};
use crate::forest::ResourceForest;
use crate::list::ResourceTreeList;
use crate::node::{NodeId, ResourceTreeNode};

/// Which capability a recursive operation drives at every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOp {
    Allocate,
    Reserve,
    Release,
}

impl TreeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeOp::Allocate => "allocate",
            TreeOp::Reserve => "reserve",
            TreeOp::Release => "release",
        }
    }

    fn invoke<R: Resource>(self, resource: &R, job_id: JobId) -> ResourceResult<()> {
        match self {
            TreeOp::Allocate => resource.allocate(job_id),
            TreeOp::Reserve => resource.reserve(job_id),
            TreeOp::Release => resource.release(job_id),
        }
    }
}

impl<R: Resource> ResourceForest<R> {
    /// Allocate every resource in the subtree under `id` to `job_id`.
    pub fn allocate(&self, id: NodeId, job_id: JobId) -> TreeResult<()> {
        self.apply(TreeOp::Allocate, id, job_id)
    }

    /// Reserve every resource in the subtree under `id` for `job_id`.
    pub fn reserve(&self, id: NodeId, job_id: JobId) -> TreeResult<()> {
        self.apply(TreeOp::Reserve, id, job_id)
    }

    /// Release every resource in the subtree under `id` held by `job_id`.
    pub fn release(&self, id: NodeId, job_id: JobId) -> TreeResult<()> {
        self.apply(TreeOp::Release, id, job_id)
    }

    pub fn list_allocate<'a>(
        &self,
        list: impl Into<Option<&'a ResourceTreeList>>,
        job_id: JobId,
    ) -> TreeResult<()> {
        self.apply_list(TreeOp::Allocate, list.into(), job_id)
    }

    pub fn list_reserve<'a>(
        &self,
        list: impl Into<Option<&'a ResourceTreeList>>,
        job_id: JobId,
    ) -> TreeResult<()> {
        self.apply_list(TreeOp::Reserve, list.into(), job_id)
    }

    pub fn list_release<'a>(
        &self,
        list: impl Into<Option<&'a ResourceTreeList>>,
        job_id: JobId,
    ) -> TreeResult<()> {
        self.apply_list(TreeOp::Release, list.into(), job_id)
    }

    /// Run `op` over the subtree under `id`.
    ///
    /// A root that does not resolve is an error, unlike a child handle that
    /// stops resolving mid-walk, which simply ends that sibling list.
    pub fn apply(&self, op: TreeOp, id: NodeId, job_id: JobId) -> TreeResult<()> {
        let node = self.node(id).ok_or(TreeError::NodeNotFound(id))?;
        self.apply_node(op, id, node, job_id)?;
        debug!(node = %id, job_id, op = op.as_str(), "subtree committed");
        Ok(())
    }

    /// Run `op` over every subtree in `list`, in order, stopping at the first
    /// subtree that fails. An empty list succeeds; an absent one does not.
    pub fn apply_list(
        &self,
        op: TreeOp,
        list: Option<&ResourceTreeList>,
        job_id: JobId,
    ) -> TreeResult<()> {
        let list = list.ok_or(TreeError::ListAbsent)?;
        for id in list {
            self.apply(op, id, job_id)?;
        }
        Ok(())
    }

    fn apply_node(
        &self,
        op: TreeOp,
        id: NodeId,
        node: &ResourceTreeNode<R>,
        job_id: JobId,
    ) -> TreeResult<()> {
        if let Err(e) = op.invoke(&*node.resource, job_id) {
            warn!(
                node = %id,
                resource = node.resource.name(),
                job_id,
                op = op.as_str(),
                error = %e,
                "resource operation failed, skipping the rest of the subtree"
            );
            return Err(e.into());
        }

        for child in &node.children {
            let Some(child_node) = self.node(child) else {
                break;
            };
            self.apply_node(op, child, child_node, job_id)?;
        }
        Ok(())
    }
}
