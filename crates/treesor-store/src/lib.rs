//! The Treesor tree store.
//!
//! [`TreeStore`] combines a path-indexed [`Hierarchy`] with a
//! [`ColumnRegistry`] of identity-keyed typed columns. Callers address nodes
//! by [`Path`]; property values are stored against the node's [`NodeId`], so
//! renaming, moving, or copying nodes never invalidates stored data.
//!
//! # Architecture
//!
//! - **Topology operations** (new/remove/rename/copy/move item) act on the
//!   hierarchy only and never touch columns. Moving or renaming reuses the
//!   node's identity; copying assigns fresh identities.
//! - **Property operations** (set/get/clear/copy/move value) validate column
//!   names first, then resolve nodes, then check types. Source arguments are
//!   validated before destination arguments at every stage.
//! - Topology operations that find nothing to do (missing source, occupied
//!   destination) are silent no-ops. Property operations always fail on a
//!   missing node or column.
//!
//! # Modules
//!
//! - [`error`] - [`StoreError`], the store's failure taxonomy
//! - [`item`] - [`Item`], a path and identity pair
//! - [`store`] - [`TreeStore`], the orchestrator
//! - [`config`] - [`StoreConfig`], TOML-loadable construction settings
//! - [`snapshot`] - Whole-store snapshots in JSON or binary form
//! - [`shared`] - [`SharedTreeStore`], a lock-guarded handle for threads
//!
//! [`Hierarchy`]: treesor_hierarchy::Hierarchy
//! [`ColumnRegistry`]: treesor_columns::ColumnRegistry
//! [`Path`]: treesor_types::Path
//! [`NodeId`]: treesor_types::NodeId

pub mod config;
pub mod error;
pub mod item;
pub mod shared;
pub mod snapshot;
pub mod store;

pub use config::{ColumnSpec, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use item::Item;
pub use shared::SharedTreeStore;
pub use snapshot::{load_snapshot, save_snapshot, SnapshotFormat, StoreSnapshot};
pub use store::TreeStore;

pub use treesor_columns::ColumnInfo;
pub use treesor_hierarchy::{Hierarchy, InMemoryHierarchy, TraversalOrder};
pub use treesor_types::{NodeId, Path, Value, ValueType};
