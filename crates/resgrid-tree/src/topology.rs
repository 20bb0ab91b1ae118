//! Building a resource forest from a topology description.

use std::sync::Arc;

use resgrid_resrc::{ResourceSpec, Resrc, TopologyConfig};
use tracing::info;

use crate::error::TreeResult;
use crate::forest::ResourceForest;
use crate::list::ResourceTreeList;
use crate::node::NodeId;

impl ResourceForest<Resrc> {
    /// Create one [`Resrc`] per topology entry and a tree mirroring the
    /// nesting. Returns the forest and its top-level nodes in file order.
    pub fn from_topology(config: &TopologyConfig) -> TreeResult<(Self, ResourceTreeList)> {
        let mut forest = Self::new();
        let roots = forest.load_topology(config)?;
        Ok((forest, roots))
    }

    /// Add the resources of `config` to this forest as new roots.
    pub fn load_topology(&mut self, config: &TopologyConfig) -> TreeResult<ResourceTreeList> {
        let base = config.root_path();
        let mut roots = ResourceTreeList::try_with_capacity(config.resources.len())?;
        for spec in &config.resources {
            roots.append(self.load_spec(None, spec, &base)?)?;
        }
        info!(
            cluster = config.cluster.as_deref().unwrap_or("-"),
            resources = config.resource_count(),
            "topology loaded"
        );
        Ok(roots)
    }

    fn load_spec(
        &mut self,
        parent: Option<NodeId>,
        spec: &ResourceSpec,
        parent_path: &str,
    ) -> TreeResult<NodeId> {
        let resrc = spec.to_resrc(parent_path);
        let path = resrc.path().to_string();
        let id = self.create(parent, Arc::new(resrc))?;
        for child in &spec.children {
            self.load_spec(Some(id), child, &path)?;
        }
        Ok(id)
    }

    /// First node in the subtree under `root` whose resource path is `path`.
    pub fn find_path(&self, root: NodeId, path: &str) -> Option<NodeId> {
        self.walk(root)
            .map(|(id, _)| id)
            .find(|&id| self.resource_of(id).is_some_and(|r| r.path() == path))
    }
}
