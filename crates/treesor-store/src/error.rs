//! Error types for tree store operations.

use thiserror::Error;
use treesor_columns::ColumnError;
use treesor_hierarchy::HierarchyError;
use treesor_types::{NodeId, Path, TypeError, ValueType};

/// Errors that can occur during tree store operations.
///
/// Errors from the hierarchy and column layers are translated into these
/// kinds so callers match on a single enum.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The path does not resolve to a node.
    #[error("node '{0}' doesn't exist")]
    MissingNode(Path),

    /// A node already exists at the path being created.
    #[error("item '{0}' already exists")]
    DuplicateItem(Path),

    /// No column with this name exists.
    #[error("property '{0}' doesn't exist")]
    MissingProperty(String),

    /// A column was redefined with a different type.
    #[error("column '{name}' already defined with type '{existing}'")]
    ColumnTypeConflict { name: String, existing: ValueType },

    /// A column rename collides with another column.
    #[error("column name '{0}' is already in use")]
    DuplicateColumnName(String),

    /// A value's type differs from the target column's declared type.
    #[error(
        "couldn't assign value '{value}' (type '{value_type}') to property '{property}' \
         at node '{node}': value type must be '{expected}'"
    )]
    TypeMismatch {
        value: String,
        value_type: ValueType,
        property: String,
        node: NodeId,
        expected: ValueType,
    },

    /// NaN and infinite floats cannot be stored.
    #[error(
        "couldn't assign value '{value}' to property '{property}' at node '{node}': \
         value must be finite"
    )]
    NonFiniteValue {
        value: String,
        property: String,
        node: NodeId,
    },

    /// Nodes carry no intrinsic value.
    #[error("a value for node '{0}' is not allowed")]
    UnsupportedValue(Path),

    /// A required argument was empty.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// Non-recursive removal of a node that has descendants.
    #[error("node '{0}' has child nodes")]
    NodeHasChildren(Path),

    /// A path or segment is malformed.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] TypeError),

    /// Failure reported by a hierarchy backend or lock.
    #[error("backend error: {0}")]
    Backend(String),

    /// Snapshot or configuration encoding failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error while reading or writing a snapshot or config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<HierarchyError> for StoreError {
    fn from(err: HierarchyError) -> Self {
        match err {
            HierarchyError::NotFound(path) => Self::MissingNode(path),
            HierarchyError::AlreadyExists(path) => Self::DuplicateItem(path),
            HierarchyError::HasChildren(path) => Self::NodeHasChildren(path),
            HierarchyError::DuplicateId { id, path } => {
                Self::Backend(format!("node id {id} already bound at '{path}'"))
            }
            HierarchyError::Backend(msg) => Self::Backend(msg),
        }
    }
}

impl From<ColumnError> for StoreError {
    fn from(err: ColumnError) -> Self {
        match err {
            ColumnError::MissingArgument(arg) => Self::MissingArgument(arg),
            ColumnError::MissingProperty(name) => Self::MissingProperty(name),
            ColumnError::TypeConflict { name, existing } => {
                Self::ColumnTypeConflict { name, existing }
            }
            ColumnError::DuplicateName(name) => Self::DuplicateColumnName(name),
            ColumnError::TypeMismatch {
                value,
                value_type,
                property,
                node,
                expected,
            } => Self::TypeMismatch {
                value,
                value_type,
                property,
                node,
                expected,
            },
            ColumnError::NonFiniteValue {
                value,
                property,
                node,
            } => Self::NonFiniteValue {
                value,
                property,
                node,
            },
        }
    }
}

/// Convenience alias for tree store results.
pub type StoreResult<T> = Result<T, StoreError>;
