//! In-memory hierarchy backed by ordered maps.
//!
//! [`InMemoryHierarchy`] keys nodes by [`Path`] in a `BTreeMap`. Because path
//! ordering is segment-wise lexicographic, every subtree occupies one
//! contiguous key range, so descendant queries and recursive removal are
//! range scans. A reverse `HashMap` enforces identity uniqueness.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;
use treesor_types::{NodeId, Path};

use crate::error::{HierarchyError, HierarchyResult};
use crate::order::TraversalOrder;
use crate::traits::Hierarchy;

/// An in-memory implementation of [`Hierarchy`].
///
/// Data is lost when the hierarchy is dropped.
#[derive(Clone, Debug, Default)]
pub struct InMemoryHierarchy {
    nodes: BTreeMap<Path, NodeId>,
    paths: HashMap<NodeId, Path>,
}

impl InMemoryHierarchy {
    /// Create a new empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hierarchy containing only a root node with a fresh identity.
    pub fn with_root() -> Self {
        let root = Path::root();
        let id = NodeId::generate();
        Self {
            nodes: BTreeMap::from([(root.clone(), id)]),
            paths: HashMap::from([(id, root)]),
        }
    }

    /// Number of bound nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node is bound.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Strict descendants of `path` in depth-first pre-order.
    fn subtree<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = (&'a Path, &'a NodeId)> + 'a {
        self.nodes
            .range(path.clone()..)
            .take_while(move |(p, _)| p.starts_with(path))
            .filter(move |(p, _)| *p != path)
    }

    fn require(&self, path: &Path) -> HierarchyResult<()> {
        if self.nodes.contains_key(path) {
            Ok(())
        } else {
            Err(HierarchyError::NotFound(path.clone()))
        }
    }
}

impl Hierarchy for InMemoryHierarchy {
    fn resolve(&self, path: &Path) -> HierarchyResult<Option<NodeId>> {
        trace!(%path, "resolve");
        Ok(self.nodes.get(path).copied())
    }

    fn locate(&self, id: &NodeId) -> HierarchyResult<Option<Path>> {
        Ok(self.paths.get(id).cloned())
    }

    fn add(&mut self, path: &Path, id: NodeId) -> HierarchyResult<()> {
        if self.nodes.contains_key(path) {
            return Err(HierarchyError::AlreadyExists(path.clone()));
        }
        if let Some(existing) = self.paths.get(&id) {
            return Err(HierarchyError::DuplicateId {
                id,
                path: existing.clone(),
            });
        }
        self.nodes.insert(path.clone(), id);
        self.paths.insert(id, path.clone());
        Ok(())
    }

    fn remove(&mut self, path: &Path, recursive: bool) -> HierarchyResult<bool> {
        if !self.nodes.contains_key(path) {
            return Ok(false);
        }

        let doomed: Vec<Path> = self.subtree(path).map(|(p, _)| p.clone()).collect();
        if !doomed.is_empty() && !recursive {
            return Err(HierarchyError::HasChildren(path.clone()));
        }

        for p in doomed.iter().chain(std::iter::once(path)) {
            if let Some(id) = self.nodes.remove(p) {
                self.paths.remove(&id);
            }
        }
        Ok(true)
    }

    fn children(&self, path: &Path) -> HierarchyResult<Vec<(Path, NodeId)>> {
        self.require(path)?;
        let depth = path.depth() + 1;
        Ok(self
            .subtree(path)
            .filter(|(p, _)| p.depth() == depth)
            .map(|(p, id)| (p.clone(), *id))
            .collect())
    }

    fn descendants(
        &self,
        path: &Path,
        order: TraversalOrder,
    ) -> HierarchyResult<Vec<(Path, NodeId)>> {
        self.require(path)?;
        let mut result: Vec<(Path, NodeId)> =
            self.subtree(path).map(|(p, id)| (p.clone(), *id)).collect();
        if order == TraversalOrder::BreadthFirst {
            // Stable: siblings keep their segment order within each level.
            result.sort_by_key(|(p, _)| p.depth());
        }
        Ok(result)
    }

    fn has_children(&self, path: &Path) -> HierarchyResult<bool> {
        self.require(path)?;
        Ok(self.subtree(path).next().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str) -> Path {
        Path::parse(text)
    }

    /// Hierarchy with root, a, a/b, a/b/c, a/d, e.
    fn sample() -> InMemoryHierarchy {
        let mut h = InMemoryHierarchy::new();
        for text in ["", "a", "a/b", "a/b/c", "a/d", "e"] {
            h.add(&p(text), NodeId::generate()).unwrap();
        }
        h
    }

    fn paths(entries: &[(Path, NodeId)]) -> Vec<String> {
        entries.iter().map(|(p, _)| p.to_string()).collect()
    }

    #[test]
    fn add_and_resolve() {
        let mut h = InMemoryHierarchy::new();
        let id = NodeId::generate();
        h.add(&p("a"), id).unwrap();
        assert_eq!(h.resolve(&p("a")).unwrap(), Some(id));
        assert!(h.exists(&p("a")).unwrap());
        assert!(!h.exists(&p("b")).unwrap());
        assert_eq!(h.locate(&id).unwrap(), Some(p("a")));
    }

    #[test]
    fn with_root_binds_only_root() {
        let h = InMemoryHierarchy::with_root();
        assert_eq!(h.len(), 1);
        let id = h.resolve(&Path::root()).unwrap().unwrap();
        assert_eq!(h.locate(&id).unwrap(), Some(Path::root()));
    }

    #[test]
    fn add_existing_path_fails() {
        let mut h = InMemoryHierarchy::new();
        let first = NodeId::generate();
        h.add(&p("a"), first).unwrap();
        let err = h.add(&p("a"), NodeId::generate()).unwrap_err();
        assert!(matches!(err, HierarchyError::AlreadyExists(_)));
        assert_eq!(h.resolve(&p("a")).unwrap(), Some(first));
    }

    #[test]
    fn add_bound_id_elsewhere_fails() {
        let mut h = InMemoryHierarchy::new();
        let id = NodeId::generate();
        h.add(&p("a"), id).unwrap();
        let err = h.add(&p("b"), id).unwrap_err();
        assert!(matches!(err, HierarchyError::DuplicateId { .. }));
        assert!(!h.exists(&p("b")).unwrap());
    }

    #[test]
    fn children_are_direct_only() {
        let h = sample();
        assert_eq!(paths(&h.children(&p("a")).unwrap()), ["a/b", "a/d"]);
        assert_eq!(paths(&h.children(&Path::root()).unwrap()), ["a", "e"]);
        assert!(h.children(&p("e")).unwrap().is_empty());
    }

    #[test]
    fn children_of_missing_node_fails() {
        let h = sample();
        assert!(matches!(
            h.children(&p("zzz")),
            Err(HierarchyError::NotFound(_))
        ));
    }

    #[test]
    fn descendants_depth_first() {
        let h = sample();
        let d = h.descendants(&Path::root(), TraversalOrder::DepthFirst).unwrap();
        assert_eq!(paths(&d), ["a", "a/b", "a/b/c", "a/d", "e"]);
    }

    #[test]
    fn descendants_breadth_first() {
        let h = sample();
        let d = h
            .descendants(&Path::root(), TraversalOrder::BreadthFirst)
            .unwrap();
        assert_eq!(paths(&d), ["a", "e", "a/b", "a/d", "a/b/c"]);
    }

    #[test]
    fn descendants_exclude_similarly_named_siblings() {
        let mut h = sample();
        h.add(&p("a-x"), NodeId::generate()).unwrap();
        let d = h.descendants(&p("a"), TraversalOrder::DepthFirst).unwrap();
        assert_eq!(paths(&d), ["a/b", "a/b/c", "a/d"]);
    }

    #[test]
    fn remove_leaf() {
        let mut h = sample();
        let id = h.resolve(&p("a/d")).unwrap().unwrap();
        assert!(h.remove(&p("a/d"), false).unwrap());
        assert!(!h.exists(&p("a/d")).unwrap());
        assert_eq!(h.locate(&id).unwrap(), None);
    }

    #[test]
    fn remove_with_children_requires_recursive() {
        let mut h = sample();
        let err = h.remove(&p("a"), false).unwrap_err();
        assert!(matches!(err, HierarchyError::HasChildren(_)));
        assert!(h.exists(&p("a/b/c")).unwrap());

        assert!(h.remove(&p("a"), true).unwrap());
        for gone in ["a", "a/b", "a/b/c", "a/d"] {
            assert!(!h.exists(&p(gone)).unwrap(), "{gone} should be removed");
        }
        assert!(h.exists(&p("e")).unwrap());
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn remove_missing_returns_false() {
        let mut h = sample();
        assert!(!h.remove(&p("nope"), true).unwrap());
        assert_eq!(h.len(), 6);
    }

    #[test]
    fn structural_gap_is_not_a_child() {
        let mut h = InMemoryHierarchy::new();
        h.add(&Path::root(), NodeId::generate()).unwrap();
        h.add(&p("x/y"), NodeId::generate()).unwrap();
        assert!(!h.exists(&p("x")).unwrap());
        assert!(h.children(&Path::root()).unwrap().is_empty());
        assert!(h.has_children(&Path::root()).unwrap());
        let d = h.descendants(&Path::root(), TraversalOrder::DepthFirst).unwrap();
        assert_eq!(paths(&d), ["x/y"]);
    }
}
