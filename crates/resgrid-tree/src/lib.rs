//! resgrid-tree — the resource hierarchy engine.
//!
//! Represents the nested resource topology a job scheduler allocates against
//! (cluster → rack → node → socket → core) and implements the mechanical,
//! recursive operations applied to a selected subtree: allocate, reserve,
//! release, and structural serialization. Deciding *which* resources to
//! select is not this crate's job; a selection algorithm hands us a
//! [`ResourceTreeList`] of candidate subtrees and we commit them.
//!
//! # Architecture
//!
//! ```text
//! ResourceForest<R>                 (arena, owns every node)
//!   └── slot[NodeId] → ResourceTreeNode<R>
//!         ├── resource: Arc<R>      (shared, not owned by the tree)
//!         ├── parent:   Option<NodeId>   (navigation only)
//!         └── children: ResourceTreeList (ordered NodeIds)
//! ```
//!
//! Handles are generational: once a node is destroyed its [`NodeId`] stops
//! resolving, even after the slot is reused.
//!
//! # Components
//!
//! - **`forest`** — Arena, node lifecycle (create, attach, detach, copy, destroy)
//! - **`list`** — [`ResourceTreeList`], the ordered node container
//! - **`ops`** — Recursive allocate / reserve / release
//! - **`serialize`** — JSON rendering of committed trees
//! - **`print`** — Pre-order debug dump
//! - **`topology`** — Building a forest from a topology file

pub mod error;
pub mod forest;
pub mod list;
pub mod node;
pub mod ops;
pub mod print;
pub mod serialize;
pub mod topology;

pub use error::{TreeError, TreeResult};
pub use forest::{ResourceForest, Walk};
pub use list::ResourceTreeList;
pub use node::{NodeId, ResourceTreeNode};
pub use ops::TreeOp;
pub use print::TreeDisplay;
