//! Pre-order debug dump of a subtree.

use std::fmt;

use crate::forest::ResourceForest;
use crate::list::ResourceTreeList;
use crate::node::NodeId;

/// Displays a subtree one resource per line, indented by depth.
///
/// Returned by [`ResourceForest::display`]. A node that does not resolve
/// renders as nothing.
pub struct TreeDisplay<'a, R> {
    forest: &'a ResourceForest<R>,
    root: NodeId,
}

impl<R: fmt::Display> fmt::Display for TreeDisplay<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, depth) in self.forest.walk(self.root) {
            if let Some(resource) = self.forest.resource_of(id) {
                writeln!(f, "{:indent$}{resource}", "", indent = depth * 2)?;
            }
        }
        Ok(())
    }
}

impl<R: fmt::Display> ResourceForest<R> {
    pub fn display(&self, id: NodeId) -> TreeDisplay<'_, R> {
        TreeDisplay {
            forest: self,
            root: id,
        }
    }

    /// Dump the subtree under `id` to stdout.
    pub fn print(&self, id: NodeId) {
        print!("{}", self.display(id));
    }

    /// Dump every subtree in `list` to stdout, in list order.
    pub fn print_list(&self, list: &ResourceTreeList) {
        for id in list {
            self.print(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn renders_pre_order_indented() {
        let mut f = ResourceForest::new();
        let rack = f.create(None, Arc::new("rack0")).unwrap();
        let node0 = f.create(Some(rack), Arc::new("node0")).unwrap();
        f.create(Some(node0), Arc::new("core0")).unwrap();
        f.create(Some(rack), Arc::new("node1")).unwrap();

        assert_eq!(
            f.display(rack).to_string(),
            "rack0\n  node0\n    core0\n  node1\n"
        );
    }

    #[test]
    fn absent_node_renders_empty() {
        let mut f = ResourceForest::new();
        let rack = f.create(None, Arc::new("rack0")).unwrap();
        f.destroy(rack).unwrap();
        assert_eq!(f.display(rack).to_string(), "");
    }
}
