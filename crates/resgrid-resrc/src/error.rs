//! Error types for resource capability operations.

use thiserror::Error;

use crate::resource::JobId;

/// Result type alias for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Errors a resource reports back through the capability interface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("invalid job id: {0}")]
    InvalidJob(JobId),

    #[error("resource {resource} has no capacity left for job {job_id}")]
    Unavailable { resource: String, job_id: JobId },

    #[error("job {job_id} already holds resource {resource}")]
    AlreadyHeld { resource: String, job_id: JobId },

    #[error("job {job_id} does not hold resource {resource}")]
    NotHeld { resource: String, job_id: JobId },

    #[error("serialization error: {0}")]
    Serialize(String),
}
