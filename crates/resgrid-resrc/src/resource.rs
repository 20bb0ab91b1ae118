//! The resource capability interface consumed by the tree engine.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::ResourceResult;

/// Opaque job identifier correlating allocate/reserve with a later release.
pub type JobId = i64;

/// Capabilities the tree engine needs from a resource.
///
/// All methods take `&self`. A resource is shared between whoever owns the
/// cluster inventory and every tree node that points at it, so state
/// transitions go through interior mutability. Detecting double allocation
/// or a release by a job that holds nothing is the implementor's job, not
/// the tree's.
///
/// [`fmt::Display`] is the debug rendering used by tree printing.
pub trait Resource: fmt::Display {
    /// Stable identifier, used as the nesting key during serialization.
    fn name(&self) -> &str;

    /// Commit this resource to `job_id` for immediate exclusive use.
    fn allocate(&self, job_id: JobId) -> ResourceResult<()>;

    /// Commit this resource to `job_id` for a future window.
    fn reserve(&self, job_id: JobId) -> ResourceResult<()>;

    /// Return whatever `job_id` holds on this resource to the pool.
    fn release(&self, job_id: JobId) -> ResourceResult<()>;

    /// Write this resource's own fields into `out`.
    fn to_json(&self, out: &mut Map<String, Value>) -> ResourceResult<()>;
}
