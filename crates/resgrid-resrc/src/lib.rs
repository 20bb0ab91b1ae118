//! resgrid-resrc — schedulable resources for the resgrid tree engine.
//!
//! A resource is a single schedulable entity (a rack, a node, a socket, a
//! core) that can be allocated to, reserved for, and released by a job.
//! The tree engine in `resgrid-tree` never looks inside a resource; it only
//! drives it through the [`Resource`] capability trait.
//!
//! # Components
//!
//! - **`resource`** — The [`Resource`] capability trait and [`JobId`]
//! - **`resrc`** — [`Resrc`], an in-memory resource with an
//!   idle/allocated/reserved state machine
//! - **`topology`** — TOML topology files describing a resource hierarchy

pub mod error;
pub mod resource;
pub mod resrc;
pub mod topology;

pub use error::{ResourceError, ResourceResult};
pub use resource::{JobId, Resource};
pub use resrc::{ResourceState, Resrc};
pub use topology::{ResourceSpec, TopologyConfig};
