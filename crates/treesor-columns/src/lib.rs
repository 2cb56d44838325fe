//! Typed sparse property columns for Treesor.
//!
//! A [`Column`] is a named, typed mapping from
//! [`NodeId`](treesor_types::NodeId) to [`Value`](treesor_types::Value). Columns
//! never see paths: renaming or moving a node leaves its column entries
//! untouched because the identity does not change.
//!
//! The [`ColumnRegistry`] owns every column of a store and is the only place
//! column names and declared types are validated.

pub mod column;
pub mod error;
pub mod registry;

pub use column::{Column, ColumnInfo};
pub use error::{ColumnError, ColumnResult};
pub use registry::ColumnRegistry;
