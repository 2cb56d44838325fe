//! Error types for column operations.

use thiserror::Error;
use treesor_types::{NodeId, ValueType};

/// Errors that can occur during column operations.
#[derive(Debug, Error, PartialEq)]
pub enum ColumnError {
    /// A required name argument was empty.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// No column with this name exists.
    #[error("property '{0}' doesn't exist")]
    MissingProperty(String),

    /// The column already exists with a different declared type.
    #[error("column '{name}' already defined with type '{existing}'")]
    TypeConflict { name: String, existing: ValueType },

    /// The target name of a rename is used by another column.
    #[error("column name '{0}' is already in use")]
    DuplicateName(String),

    /// The value's runtime type differs from the column's declared type.
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
}

/// Convenience alias for column results.
pub type ColumnResult<T> = Result<T, ColumnError>;
