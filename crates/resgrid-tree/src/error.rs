//! Resource tree error types.

use resgrid_resrc::ResourceError;
use thiserror::Error;

use crate::node::NodeId;

/// Errors that can occur during resource tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("resource tree list is absent")]
    ListAbsent,

    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("out of memory growing the resource tree")]
    Exhausted,

    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),
}

pub type TreeResult<T> = Result<T, TreeError>;
