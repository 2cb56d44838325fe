//! The [`Hierarchy`] trait defining the path-to-identity storage interface.
//!
//! Any backend (in-memory, embedded document store, database) implements
//! this trait. The tree store depends only on this contract.

use treesor_types::{NodeId, Path};

use crate::error::HierarchyResult;
use crate::order::TraversalOrder;

/// Path-indexed tree of node identities.
///
/// Implementations must guarantee that a path resolves to at most one
/// identity and that an identity is bound to at most one path. Nodes may be
/// added below a path that does not itself resolve; such an ancestor is
/// purely structural and is reported by neither [`resolve`] nor
/// [`children`].
///
/// [`resolve`]: Hierarchy::resolve
/// [`children`]: Hierarchy::children
pub trait Hierarchy: Send + Sync {
    /// The identity bound at `path`.
    ///
    /// Returns `Ok(None)` if the path does not resolve.
    fn resolve(&self, path: &Path) -> HierarchyResult<Option<NodeId>>;

    /// The path `id` is currently bound at, if any.
    fn locate(&self, id: &NodeId) -> HierarchyResult<Option<Path>>;

    /// Bind `id` at `path`.
    ///
    /// Fails with `AlreadyExists` if the path already resolves and with
    /// `DuplicateId` if the identity is bound elsewhere.
    fn add(&mut self, path: &Path, id: NodeId) -> HierarchyResult<()>;

    /// Remove the node at `path`.
    ///
    /// Returns `Ok(false)` if the path does not resolve. Fails with
    /// `HasChildren` if the node has descendants and `recursive` is false;
    /// otherwise the node and all its descendants are removed.
    fn remove(&mut self, path: &Path, recursive: bool) -> HierarchyResult<bool>;

    /// Direct children of a resolving node, ordered by segment.
    ///
    /// Fails with `NotFound` if `path` does not resolve.
    fn children(&self, path: &Path) -> HierarchyResult<Vec<(Path, NodeId)>>;

    /// All descendants of a resolving node (not including the node itself).
    ///
    /// Fails with `NotFound` if `path` does not resolve.
    fn descendants(
        &self,
        path: &Path,
        order: TraversalOrder,
    ) -> HierarchyResult<Vec<(Path, NodeId)>>;

    /// Returns `true` if `path` resolves.
    fn exists(&self, path: &Path) -> HierarchyResult<bool> {
        Ok(self.resolve(path)?.is_some())
    }

    /// Returns `true` if the node at `path` has at least one descendant.
    fn has_children(&self, path: &Path) -> HierarchyResult<bool> {
        Ok(!self.descendants(path, TraversalOrder::DepthFirst)?.is_empty())
    }
}
