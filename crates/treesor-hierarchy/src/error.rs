//! Error types for hierarchy operations.

use thiserror::Error;
use treesor_types::{NodeId, Path};

/// Errors that can occur during hierarchy operations.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// The path does not resolve to a node.
    #[error("node not found: '{0}'")]
    NotFound(Path),

    /// A node already exists at this path.
    #[error("node already exists: '{0}'")]
    AlreadyExists(Path),

    /// The identity is already bound to another path.
    #[error("node id {id} already bound at '{path}'")]
    DuplicateId { id: NodeId, path: Path },

    /// Non-recursive removal of a node that has descendants.
    #[error("node '{0}' has child nodes")]
    HasChildren(Path),

    /// Failure reported by a persistent backend.
    #[error("hierarchy backend error: {0}")]
    Backend(String),
}

/// Convenience type alias for hierarchy operations.
pub type HierarchyResult<T> = Result<T, HierarchyError>;
