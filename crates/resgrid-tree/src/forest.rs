//! Node arena and node lifecycle.
//!
//! [`ResourceForest`] owns every [`ResourceTreeNode`]. Parent links are plain
//! handles, so a node and its children never own each other; the forest is
//! the single owner and destroying a subtree is a walk over the arena.

use std::sync::Arc;

use tracing::debug;

use crate::error::{TreeError, TreeResult};
use crate::list::ResourceTreeList;
use crate::node::{NodeId, ResourceTreeNode};

#[derive(Debug)]
struct Slot<R> {
    generation: u32,
    node: Option<ResourceTreeNode<R>>,
}

/// Arena of resource tree nodes addressed by generational [`NodeId`]s.
///
/// The forest may hold any number of independent trees. It is not
/// synchronized; callers serialize mutation of a forest themselves.
#[derive(Debug)]
pub struct ResourceForest<R> {
    slots: Vec<Slot<R>>,
    free: Vec<u32>,
    len: usize,
}

impl<R> Default for ResourceForest<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ResourceForest<R> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of live nodes across all trees.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Resolve a handle. `None` once the node has been destroyed.
    pub fn node(&self, id: NodeId) -> Option<&ResourceTreeNode<R>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut ResourceTreeNode<R>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    // ── Accessors ─────────────────────────────────────────────────
    //
    // Queries on a node that does not resolve answer "nothing" instead of
    // failing, so absent nodes can flow through call sites unchecked.

    pub fn resource_of(&self, id: NodeId) -> Option<&Arc<R>> {
        self.node(id).map(|n| &n.resource)
    }

    pub fn children_of(&self, id: NodeId) -> Option<&ResourceTreeList> {
        self.node(id).map(|n| &n.children)
    }

    pub fn num_children(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.children.len())
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Number of resolvable ancestors above `id`; roots are at depth 0.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut node = self.node(id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent.and_then(|p| self.node(p)) {
            depth += 1;
            node = parent;
        }
        Some(depth)
    }

    /// Live nodes that no live node lists as a child.
    ///
    /// This includes nodes made by [`copy`](Self::copy), which keep a parent
    /// link without being in that parent's children.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(|&id| {
            self.parent_of(id)
                .and_then(|p| self.children_of(p))
                .is_none_or(|siblings| !siblings.contains(id))
        })
    }

    /// Every live node handle, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|_| NodeId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    /// Pre-order traversal of the subtree under `id`, yielding each node
    /// with its depth relative to `id`.
    ///
    /// Each call gets its own position, so walks may be nested or
    /// interleaved freely. Child handles that no longer resolve are skipped.
    pub fn walk(&self, id: NodeId) -> Walk<'_, R> {
        Walk {
            forest: self,
            stack: vec![(id, 0)],
        }
    }

    /// Whether hanging `child` under `parent` would close a loop.
    ///
    /// Parent links alone are not enough: a [`copy`](Self::copy) lists
    /// children whose parent link points elsewhere, so `parent` may sit below
    /// `child` only by way of a children list.
    fn would_cycle(&self, parent: NodeId, child: NodeId) -> bool {
        self.is_ancestor_or_self(child, parent) || self.walk(child).any(|(n, _)| n == parent)
    }

    /// Whether `ancestor` is `id` itself or lies on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        // A parent chain never exceeds the node count.
        for _ in 0..=self.len {
            match current {
                Some(c) if c == ancestor => return true,
                Some(c) => current = self.parent_of(c),
                None => return false,
            }
        }
        false
    }

    // ── Lifecycle ─────────────────────────────────────────────────

    /// Create a node for `resource`.
    ///
    /// When `parent` is given the new node is appended to the parent's
    /// children in the same step; if the parent does not resolve, nothing is
    /// created.
    pub fn create(&mut self, parent: Option<NodeId>, resource: Arc<R>) -> TreeResult<NodeId> {
        if let Some(p) = parent {
            self.node_mut(p)
                .ok_or(TreeError::NodeNotFound(p))?
                .children
                .reserve_one()?;
        }

        let id = self.alloc(ResourceTreeNode {
            resource,
            parent,
            children: ResourceTreeList::new(),
        })?;

        if let Some(pnode) = parent.and_then(|p| self.node_mut(p)) {
            pnode.children.push(id);
        }
        debug!(node = %id, parent = ?parent, "tree node created");
        Ok(id)
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// A child that already hangs under some node is moved, so it never
    /// appears in two children lists. Attaching a node under itself or one
    /// of its descendants is refused.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        if !self.contains(parent) {
            return Err(TreeError::NodeNotFound(parent));
        }
        if !self.contains(child) {
            return Err(TreeError::NodeNotFound(child));
        }
        if self.would_cycle(parent, child) {
            return Err(TreeError::Cycle { parent, child });
        }

        if let Some(pnode) = self.node_mut(parent) {
            pnode.children.reserve_one()?;
        }
        self.detach(child)?;
        if let Some(pnode) = self.node_mut(parent) {
            pnode.children.push(child);
        }
        if let Some(cnode) = self.node_mut(child) {
            cnode.parent = Some(parent);
        }
        Ok(())
    }

    /// Unlink `id` from its parent without destroying anything. The node
    /// becomes the root of its own tree; a root is left as is.
    pub fn detach(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.node_mut(id).ok_or(TreeError::NodeNotFound(id))?;
        if let Some(parent) = node.parent.take() {
            if let Some(pnode) = self.node_mut(parent) {
                pnode.children.remove(id);
            }
        }
        Ok(())
    }

    /// Shallow copy of a single node.
    ///
    /// The copy gets the same resource, the same parent link, and a *new*
    /// children list naming the *same* child handles. It is not registered
    /// in the parent's children, and the children still point back at the
    /// original. Appending to or removing from the copy's list leaves the
    /// original's list untouched, but both nodes now claim the same
    /// children: destroying either one destroys the shared subtrees, and
    /// the other is left holding handles that no longer resolve.
    ///
    /// Use [`deep_copy`](Self::deep_copy) for an independent subtree.
    pub fn copy(&mut self, id: NodeId) -> TreeResult<NodeId> {
        let node = self.node(id).ok_or(TreeError::NodeNotFound(id))?;
        let mut children = ResourceTreeList::try_with_capacity(node.children.len())?;
        for child in &node.children {
            children.push(child);
        }
        let copy = ResourceTreeNode {
            resource: Arc::clone(&node.resource),
            parent: node.parent,
            children,
        };

        let new_id = self.alloc(copy)?;
        debug!(node = %id, copy = %new_id, "tree node copied (children shared)");
        Ok(new_id)
    }

    /// Copy the whole subtree under `id`, placing the new root under
    /// `parent` (or as a new root). Every copied node has its own children
    /// and correct parent links; resources are shared, not duplicated.
    ///
    /// On failure nothing of the partial copy is left behind.
    pub fn deep_copy(&mut self, id: NodeId, parent: Option<NodeId>) -> TreeResult<NodeId> {
        if !self.contains(id) {
            return Err(TreeError::NodeNotFound(id));
        }
        if let Some(p) = parent {
            if self.would_cycle(p, id) {
                return Err(TreeError::Cycle { parent: p, child: id });
            }
        }
        self.deep_copy_into(id, parent)
    }

    fn deep_copy_into(&mut self, id: NodeId, parent: Option<NodeId>) -> TreeResult<NodeId> {
        let (resource, children) = match self.node(id) {
            Some(node) => (Arc::clone(&node.resource), node.children.clone()),
            None => return Err(TreeError::NodeNotFound(id)),
        };

        let new_id = self.create(parent, resource)?;
        for child in &children {
            if !self.contains(child) {
                break;
            }
            if let Err(e) = self.deep_copy_into(child, Some(new_id)) {
                self.destroy(new_id)?;
                return Err(e);
            }
        }
        Ok(new_id)
    }

    /// Destroy `id` and every node below it, unlinking `id` from its parent
    /// first. Returns the number of nodes destroyed.
    ///
    /// Handles to destroyed nodes stop resolving. A child shared with a
    /// [`copy`](Self::copy) is destroyed once and dropped from the children
    /// list of the node it points back at.
    pub fn destroy(&mut self, id: NodeId) -> TreeResult<usize> {
        if !self.contains(id) {
            return Err(TreeError::NodeNotFound(id));
        }

        let mut stack = vec![id];
        let mut destroyed = 0;
        while let Some(current) = stack.pop() {
            let Some(node) = self.free(current) else {
                continue;
            };
            destroyed += 1;
            if let Some(pnode) = node.parent.and_then(|p| self.node_mut(p)) {
                pnode.children.remove(current);
            }
            stack.extend(node.children.into_iter().rev());
        }

        debug!(node = %id, destroyed, "subtree destroyed");
        Ok(destroyed)
    }

    /// Destroy every subtree named by `list`, then drop the list.
    /// Entries already destroyed through an earlier entry are skipped.
    pub fn destroy_list(&mut self, list: ResourceTreeList) -> usize {
        let mut destroyed = 0;
        for id in list {
            if let Ok(n) = self.destroy(id) {
                destroyed += n;
            }
        }
        destroyed
    }

    // ── Storage ───────────────────────────────────────────────────

    fn alloc(&mut self, node: ResourceTreeNode<R>) -> TreeResult<NodeId> {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len()).map_err(|_| TreeError::Exhausted)?;
                self.slots
                    .try_reserve(1)
                    .map_err(|_| TreeError::Exhausted)?;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        self.len += 1;
        Ok(id)
    }

    /// Discard a node's own storage (its slot and its children container).
    /// Does not recurse and does not unlink from the parent; only
    /// [`destroy`](Self::destroy) calls this.
    fn free(&mut self, id: NodeId) -> Option<ResourceTreeNode<R>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(node)
    }
}

/// Pre-order iterator returned by [`ResourceForest::walk`].
pub struct Walk<'a, R> {
    forest: &'a ResourceForest<R>,
    stack: Vec<(NodeId, usize)>,
}

impl<R> Iterator for Walk<'_, R> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, depth) = self.stack.pop()?;
            let Some(node) = self.forest.node(id) else {
                continue;
            };
            self.stack
                .extend(node.children.iter().rev().map(|c| (c, depth + 1)));
            return Some((id, depth));
        }
    }
}
