//! Path-indexed node hierarchy for Treesor.
//!
//! The hierarchy maps each [`Path`](treesor_types::Path) to at most one
//! [`NodeId`](treesor_types::NodeId) and answers structural questions
//! (children, descendants). It knows nothing about property columns.
//!
//! # Modules
//!
//! - [`error`] - Error types for hierarchy operations
//! - [`traits`] - The [`Hierarchy`] trait every backend implements
//! - [`memory`] - [`InMemoryHierarchy`], an ordered-map backend
//! - [`order`] - [`TraversalOrder`] for descendant enumeration

pub mod error;
pub mod memory;
pub mod order;
pub mod traits;

pub use error::{HierarchyError, HierarchyResult};
pub use memory::InMemoryHierarchy;
pub use order::TraversalOrder;
pub use traits::Hierarchy;
