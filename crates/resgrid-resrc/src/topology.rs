//! Topology file parser.
//!
//! A topology file describes the resource hierarchy as nested tables:
//!
//! ```toml
//! cluster = "hype"
//!
//! [[resources]]
//! type = "rack"
//! name = "rack0"
//!
//! [[resources.children]]
//! type = "node"
//! name = "node0"
//! size = 1
//! tags = ["gpu"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::resrc::Resrc;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopologyConfig {
    /// Optional name of the cluster, used as the path prefix.
    pub cluster: Option<String>,
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default = "default_size")]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResourceSpec>,
}

fn default_size() -> u64 {
    1
}

impl TopologyConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate topology text.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: TopologyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Path prefix every top-level resource hangs under.
    pub fn root_path(&self) -> String {
        match &self.cluster {
            Some(cluster) => format!("/{cluster}"),
            None => String::new(),
        }
    }

    /// Total number of resources described, at every depth.
    pub fn resource_count(&self) -> usize {
        self.resources.iter().map(ResourceSpec::count).sum()
    }

    /// Reject empty names and siblings sharing a name.
    ///
    /// Sibling names become object keys when a tree is serialized, so two
    /// siblings with the same name would overwrite each other.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_level(&self.resources, &self.root_path())
    }
}

impl ResourceSpec {
    /// Build the resource for this entry, placed under `parent_path`.
    pub fn to_resrc(&self, parent_path: &str) -> Resrc {
        Resrc::new(&self.kind, &self.name, self.id, self.size)
            .with_path(format!("{parent_path}/{}", self.name))
            .with_tags(self.tags.iter().cloned())
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(ResourceSpec::count).sum::<usize>()
    }
}

fn validate_level(specs: &[ResourceSpec], path: &str) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for spec in specs {
        if spec.name.is_empty() {
            bail!("resource of type {:?} under {path:?} has an empty name", spec.kind);
        }
        if !seen.insert(spec.name.as_str()) {
            bail!("duplicate resource name {:?} under {path:?}", spec.name);
        }
        validate_level(&spec.children, &format!("{path}/{}", spec.name))?;
    }
    Ok(())
}
