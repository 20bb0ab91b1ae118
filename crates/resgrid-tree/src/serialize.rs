//! Structural JSON rendering of resource trees.
//!
//! The document shape is what the launcher side consumes:
//!
//! - A leaf merges its resource's own fields into the object it is
//!   rendered into.
//! - An internal node adds a nested object keyed by its resource name and
//!   renders each child into that nested object.
//!
//! So `rack0 → [node0, node1]` becomes `{"rack0": {<node0>, <node1>}}`.
//! Keys are not namespaced: a later sibling overwrites fields (or a nested
//! object) of the same name written by an earlier one.

use resgrid_resrc::Resource;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{TreeError, TreeResult};
use crate::forest::ResourceForest;
use crate::list::ResourceTreeList;
use crate::node::{NodeId, ResourceTreeNode};

impl<R: Resource> ResourceForest<R> {
    /// Render the subtree under `id` into `out`.
    ///
    /// Stops at the first resource that fails to render. Whatever was
    /// written before the failure stays in `out`.
    pub fn serialize(&self, out: &mut Map<String, Value>, id: NodeId) -> TreeResult<()> {
        let node = self.node(id).ok_or(TreeError::NodeNotFound(id))?;
        self.serialize_node(out, id, node)
    }

    /// Render every subtree in `list` into the same `out`, in list order.
    pub fn list_serialize<'a>(
        &self,
        out: &mut Map<String, Value>,
        list: impl Into<Option<&'a ResourceTreeList>>,
    ) -> TreeResult<()> {
        let list = list.into().ok_or(TreeError::ListAbsent)?;
        for id in list {
            self.serialize(out, id)?;
        }
        Ok(())
    }

    /// The subtree under `id` as a standalone JSON object.
    pub fn to_json(&self, id: NodeId) -> TreeResult<Value> {
        let mut out = Map::new();
        self.serialize(&mut out, id)?;
        Ok(Value::Object(out))
    }

    /// Every subtree in `list` rendered into one JSON object.
    pub fn list_to_json(&self, list: &ResourceTreeList) -> TreeResult<Value> {
        let mut out = Map::new();
        self.list_serialize(&mut out, list)?;
        Ok(Value::Object(out))
    }

    fn serialize_node(
        &self,
        out: &mut Map<String, Value>,
        id: NodeId,
        node: &ResourceTreeNode<R>,
    ) -> TreeResult<()> {
        if node.children.is_empty() {
            return node.resource.to_json(out).map_err(|e| {
                warn!(node = %id, resource = node.resource.name(), error = %e, "resource failed to serialize");
                TreeError::from(e)
            });
        }

        let mut nested = Map::new();
        let mut result = Ok(());
        for child in &node.children {
            let Some(child_node) = self.node(child) else {
                break;
            };
            result = self.serialize_node(&mut nested, child, child_node);
            if result.is_err() {
                break;
            }
        }
        out.insert(node.resource.name().to_string(), Value::Object(nested));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::tests::{CallLog, Scripted};
    use serde_json::json;

    #[test]
    fn leaves_merge_into_parent_object() {
        let log = CallLog::default();
        let mut f = ResourceForest::new();
        let rack = f.create(None, Scripted::new("rack0", &log)).unwrap();
        f.create(Some(rack), Scripted::new("node0", &log)).unwrap();
        f.create(Some(rack), Scripted::new("node1", &log)).unwrap();

        let doc = f.to_json(rack).unwrap();

        assert_eq!(doc, json!({"rack0": {"node0": "node0", "node1": "node1"}}));
    }

    #[test]
    fn single_leaf_serializes_flat() {
        let log = CallLog::default();
        let mut f = ResourceForest::new();
        let leaf = f.create(None, Scripted::new("core0", &log)).unwrap();

        assert_eq!(f.to_json(leaf).unwrap(), json!({"core0": "core0"}));
    }

    #[test]
    fn internal_levels_nest_by_name() {
        let log = CallLog::default();
        let mut f = ResourceForest::new();
        let cluster = f.create(None, Scripted::new("c0", &log)).unwrap();
        let rack = f.create(Some(cluster), Scripted::new("rack0", &log)).unwrap();
        let node = f.create(Some(rack), Scripted::new("node0", &log)).unwrap();
        f.create(Some(node), Scripted::new("core0", &log)).unwrap();
        f.create(Some(cluster), Scripted::new("spare", &log)).unwrap();

        assert_eq!(
            f.to_json(cluster).unwrap(),
            json!({
                "c0": {
                    "rack0": {"node0": {"core0": "core0"}},
                    "spare": "spare"
                }
            })
        );
    }

    #[test]
    fn failure_stops_siblings_but_keeps_partial_output() {
        let log = CallLog::default();
        let mut f = ResourceForest::new();
        let rack = f.create(None, Scripted::new("rack0", &log)).unwrap();
        f.create(Some(rack), Scripted::new("node0", &log)).unwrap();
        f.create(Some(rack), Scripted::failing("node1", &log, &["to_json"]))
            .unwrap();
        f.create(Some(rack), Scripted::new("node2", &log)).unwrap();

        let mut out = Map::new();
        let err = f.serialize(&mut out, rack).unwrap_err();

        assert!(matches!(err, TreeError::Resource(_)));
        assert_eq!(Value::Object(out), json!({"rack0": {"node0": "node0"}}));
    }

    #[test]
    fn list_serialize_shares_one_object() {
        let log = CallLog::default();
        let mut f = ResourceForest::new();
        let a = f.create(None, Scripted::new("a", &log)).unwrap();
        let b = f.create(None, Scripted::new("b", &log)).unwrap();
        f.create(Some(b), Scripted::new("b0", &log)).unwrap();
        let list: ResourceTreeList = [a, b].into_iter().collect();

        assert_eq!(
            f.list_to_json(&list).unwrap(),
            json!({"a": "a", "b": {"b0": "b0"}})
        );
    }

    #[test]
    fn absent_inputs_fail() {
        let log = CallLog::default();
        let mut f = ResourceForest::new();
        let a = f.create(None, Scripted::new("a", &log)).unwrap();
        f.destroy(a).unwrap();

        let mut out = Map::new();
        assert_eq!(f.serialize(&mut out, a), Err(TreeError::NodeNotFound(a)));
        assert_eq!(f.list_serialize(&mut out, None), Err(TreeError::ListAbsent));
        assert!(out.is_empty());
    }
}
