//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Domain errors represent misuse of a loaded corpus tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("corpus node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("no corpus at path: {0}")]
    PathNotFound(String),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
