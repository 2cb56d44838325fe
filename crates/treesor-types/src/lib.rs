//! Foundation types for Treesor.
//!
//! This crate provides the addressing, identity, and value types shared by
//! every other Treesor crate.
//!
//! # Key Types
//!
//! - [`Path`] - Slash-delimited address of a node in the hierarchy
//! - [`NodeId`] - Stable 128-bit node identity, independent of path
//! - [`Value`] - Closed set of property values stored in columns
//! - [`ValueType`] - The declared type of a column

pub mod error;
pub mod identity;
pub mod path;
pub mod value;

pub use error::TypeError;
pub use identity::NodeId;
pub use path::{Path, SEPARATOR};
pub use value::{Value, ValueType};
