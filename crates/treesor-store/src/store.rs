//! The [`TreeStore`] orchestrator.
//!
//! Every property operation resolves a path to a [`NodeId`] through the
//! hierarchy and then works on columns keyed by that identity. Every
//! topology operation works on the hierarchy alone.

use std::collections::HashSet;

use tracing::debug;
use treesor_columns::{ColumnInfo, ColumnRegistry};
use treesor_hierarchy::{Hierarchy, InMemoryHierarchy, TraversalOrder};
use treesor_types::{NodeId, Path, Value, ValueType};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::item::Item;

/// Where a copied or moved subtree lands.
///
/// Decided once per call from the state of the destination path, before
/// any descendant is visited.
#[derive(Debug, PartialEq, Eq)]
enum Placement {
    /// The destination exists: the source lands below it, named by its leaf.
    Into(Path),
    /// The destination does not exist: the source lands exactly there.
    At(Path),
}

impl Placement {
    fn target(&self) -> &Path {
        match self {
            Self::Into(p) | Self::At(p) => p,
        }
    }
}

/// One node of a planned copy or move.
struct Relocation {
    id: NodeId,
    target: Path,
}

/// Hierarchical item store with identity-keyed typed properties.
///
/// The store always contains a root node. Column metadata and the identity
/// generator are owned per instance, so independent stores share nothing.
///
/// Mutating operations take `&mut self`; wrap the store in a
/// [`SharedTreeStore`](crate::SharedTreeStore) to share it across threads.
#[derive(Debug)]
pub struct TreeStore<H = InMemoryHierarchy> {
    hierarchy: H,
    columns: ColumnRegistry,
    traversal: TraversalOrder,
}

impl TreeStore<InMemoryHierarchy> {
    /// Create an empty in-memory store holding only the root node.
    pub fn in_memory() -> Self {
        Self {
            hierarchy: InMemoryHierarchy::with_root(),
            columns: ColumnRegistry::new(),
            traversal: TraversalOrder::default(),
        }
    }
}

impl Default for TreeStore<InMemoryHierarchy> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<H: Hierarchy> TreeStore<H> {
    /// Create a store over `hierarchy`, adding a root node if it has none.
    pub fn new(mut hierarchy: H) -> StoreResult<Self> {
        let root = Path::root();
        if !hierarchy.exists(&root)? {
            hierarchy.add(&root, NodeId::generate())?;
        }
        Ok(Self {
            hierarchy,
            columns: ColumnRegistry::new(),
            traversal: TraversalOrder::default(),
        })
    }

    /// Create a store and apply `config`: default traversal order and
    /// declared columns.
    pub fn with_config(hierarchy: H, config: &StoreConfig) -> StoreResult<Self> {
        let mut store = Self::new(hierarchy)?;
        store.traversal = config.traversal;
        for declared in &config.columns {
            store.create_column(&declared.name, declared.value_type)?;
        }
        Ok(store)
    }

    pub fn hierarchy(&self) -> &H {
        &self.hierarchy
    }

    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut ColumnRegistry {
        &mut self.columns
    }

    /// Default order used by [`descendant_items`](Self::descendant_items).
    pub fn traversal(&self) -> TraversalOrder {
        self.traversal
    }

    pub fn set_traversal(&mut self, order: TraversalOrder) {
        self.traversal = order;
    }

    // ---------------------------------------------------------------
    // Items
    // ---------------------------------------------------------------

    /// Returns `true` if `path` resolves to a node.
    pub fn item_exists(&self, path: &Path) -> StoreResult<bool> {
        Ok(self.hierarchy.exists(path)?)
    }

    /// The item at `path`.
    pub fn get_item(&self, path: &Path) -> StoreResult<Item> {
        let id = self.node_id(path)?;
        Ok(Item::new(path.clone(), id))
    }

    /// Create a node at `path` with a fresh identity.
    ///
    /// Nodes carry no intrinsic payload: any non-null `value` is rejected.
    pub fn new_item(&mut self, path: &Path, value: Option<Value>) -> StoreResult<Item> {
        if value.is_some_and(|v| !v.is_null()) {
            return Err(StoreError::UnsupportedValue(path.clone()));
        }
        if self.hierarchy.exists(path)? {
            return Err(StoreError::DuplicateItem(path.clone()));
        }

        let id = NodeId::generate();
        self.hierarchy.add(path, id)?;
        debug!(%path, id = %id.short_id(), "created item");
        Ok(Item::new(path.clone(), id))
    }

    /// Assigning a value to a node itself is never supported.
    pub fn set_item(&mut self, path: &Path, _value: Value) -> StoreResult<()> {
        self.node_id(path)?;
        Err(StoreError::UnsupportedValue(path.clone()))
    }

    /// Nodes have no intrinsic value, so there is nothing to clear.
    pub fn clear_item(&mut self, path: &Path) -> StoreResult<()> {
        self.node_id(path)?;
        Ok(())
    }

    /// Remove the node at `path`, and its descendants if `recurse` is set.
    ///
    /// Returns `Ok(false)` if nothing was removed. Fails with
    /// `NodeHasChildren` if the node has descendants and `recurse` is not
    /// set. The root node itself is never removed; removing it recursively
    /// clears the whole tree below it.
    pub fn remove_item(&mut self, path: &Path, recurse: bool) -> StoreResult<bool> {
        if !path.is_root() {
            let removed = self.hierarchy.remove(path, recurse)?;
            if removed {
                debug!(%path, recurse, "removed item");
            }
            return Ok(removed);
        }

        if !self.hierarchy.has_children(path)? {
            return Ok(false);
        }
        if !recurse {
            return Err(StoreError::NodeHasChildren(path.clone()));
        }
        // Pre-order: an ancestor is removed before its descendants are
        // visited, which then report `false`.
        for (child, _) in self.hierarchy.descendants(path, TraversalOrder::DepthFirst)? {
            self.hierarchy.remove(&child, true)?;
        }
        debug!("cleared tree below root");
        Ok(true)
    }

    /// Returns `true` if the node at `path` has descendants.
    pub fn has_child_items(&self, path: &Path) -> StoreResult<bool> {
        self.node_id(path)?;
        Ok(self.hierarchy.has_children(path)?)
    }

    /// Direct children of the node at `path`.
    pub fn child_items(&self, path: &Path) -> StoreResult<Vec<Item>> {
        self.node_id(path)?;
        Ok(self
            .hierarchy
            .children(path)?
            .into_iter()
            .map(Item::from)
            .collect())
    }

    /// Descendants of the node at `path` in the store's default order.
    pub fn descendant_items(&self, path: &Path) -> StoreResult<Vec<Item>> {
        self.descendant_items_ordered(path, self.traversal)
    }

    /// Descendants of the node at `path` in the given order.
    pub fn descendant_items_ordered(
        &self,
        path: &Path,
        order: TraversalOrder,
    ) -> StoreResult<Vec<Item>> {
        self.node_id(path)?;
        Ok(self
            .hierarchy
            .descendants(path, order)?
            .into_iter()
            .map(Item::from)
            .collect())
    }

    /// Rename the node at `path` to `new_name` within the same parent.
    ///
    /// The node keeps its identity, so its property values follow it, and
    /// its descendants move with it. Silently does nothing if `path` does
    /// not resolve, is the root, or if the new name is already taken.
    /// Returns `true` if the node was renamed.
    pub fn rename_item(&mut self, path: &Path, new_name: &str) -> StoreResult<bool> {
        if new_name.is_empty() {
            return Err(StoreError::MissingArgument("new_name"));
        }
        if !self.hierarchy.exists(path)? {
            return Ok(false);
        }
        let Some(parent) = path.parent() else {
            return Ok(false);
        };
        let target = parent.child(new_name)?;
        if target == *path {
            return Ok(false);
        }

        let renamed = self.relocate(path, &target)?;
        if renamed {
            debug!(from = %path, to = %target, "renamed item");
        }
        Ok(renamed)
    }

    /// Copy the node at `path` to `destination` with a fresh identity.
    ///
    /// If `destination` exists a single node named by the source's leaf is
    /// created under it. Otherwise the copy is created exactly at
    /// `destination` and, with `recurse`, descendants are copied to the
    /// same relative paths below it. Column values are not copied.
    ///
    /// Silently does nothing if the source does not resolve or any target
    /// slot is already occupied. Returns `true` if anything was created.
    pub fn copy_item(
        &mut self,
        path: &Path,
        destination: &Path,
        recurse: bool,
    ) -> StoreResult<bool> {
        if !self.hierarchy.exists(path)? {
            return Ok(false);
        }
        let Some(placement) = self.placement(path, destination)? else {
            return Ok(false);
        };
        let recurse = recurse && matches!(placement, Placement::At(_));
        let Some(plan) = self.plan(path, placement.target(), recurse)? else {
            return Ok(false);
        };

        for node in &plan {
            self.hierarchy.add(&node.target, NodeId::generate())?;
        }
        debug!(from = %path, to = %placement.target(), count = plan.len(), "copied item");
        Ok(true)
    }

    /// Move the node at `path` and its descendants to `destination`.
    ///
    /// If `destination` exists the node lands under it, named by its leaf;
    /// otherwise it lands exactly at `destination`. Every identity is kept,
    /// so property values stay attached. Silently does nothing if the
    /// source does not resolve, is the root, would move into its own
    /// subtree, or if any target slot is occupied. Returns `true` if the
    /// node was moved.
    pub fn move_item(&mut self, path: &Path, destination: &Path) -> StoreResult<bool> {
        if !self.hierarchy.exists(path)? {
            return Ok(false);
        }
        let Some(placement) = self.placement(path, destination)? else {
            return Ok(false);
        };
        let moved = self.relocate(path, placement.target())?;
        if moved {
            debug!(from = %path, to = %placement.target(), "moved item");
        }
        Ok(moved)
    }

    /// Decide where a copy or move of `source` lands.
    ///
    /// Returns `None` if the destination exists and the source has no leaf
    /// segment to be placed under it (the root).
    fn placement(&self, source: &Path, destination: &Path) -> StoreResult<Option<Placement>> {
        if !self.hierarchy.exists(destination)? {
            return Ok(Some(Placement::At(destination.clone())));
        }
        match source.leaf() {
            Some(leaf) => Ok(Some(Placement::Into(destination.child(leaf)?))),
            None => Ok(None),
        }
    }

    /// Map the subtree at `source` onto `target`, parents first.
    ///
    /// Returns `None` if any target path already resolves, so that the
    /// caller can leave the hierarchy untouched.
    fn plan(
        &self,
        source: &Path,
        target: &Path,
        recurse: bool,
    ) -> StoreResult<Option<Vec<Relocation>>> {
        let root_id = self.node_id(source)?;
        let mut nodes = vec![(source.clone(), root_id)];
        if recurse {
            nodes.extend(
                self.hierarchy
                    .descendants(source, TraversalOrder::BreadthFirst)?,
            );
        }

        let mut plan = Vec::with_capacity(nodes.len());
        for (path, id) in nodes {
            let Some(relative) = path.relative_to(source) else {
                continue;
            };
            let target = target.join(&relative);
            if self.hierarchy.exists(&target)? {
                debug!(%target, "target occupied; nothing relocated");
                return Ok(None);
            }
            plan.push(Relocation { id, target });
        }
        Ok(Some(plan))
    }

    /// Rebind the subtree at `source` under `target`, keeping identities.
    ///
    /// Returns `false` without changes if `target` lies inside the source
    /// subtree or any target slot is occupied.
    fn relocate(&mut self, source: &Path, target: &Path) -> StoreResult<bool> {
        if target.starts_with(source) {
            return Ok(false);
        }
        let Some(plan) = self.plan(source, target, true)? else {
            return Ok(false);
        };

        self.hierarchy.remove(source, true)?;
        for node in plan {
            self.hierarchy.add(&node.target, node.id)?;
        }
        Ok(true)
    }

    // ---------------------------------------------------------------
    // Columns
    // ---------------------------------------------------------------

    /// Create a column, or return the existing one if the type matches.
    pub fn create_column(&mut self, name: &str, value_type: ValueType) -> StoreResult<ColumnInfo> {
        Ok(self.columns.create(name, value_type)?)
    }

    /// Remove a column and all its values. Returns `false` if it did not exist.
    pub fn remove_column(&mut self, name: &str) -> bool {
        self.columns.remove(name)
    }

    /// Rename a column. Silently does nothing if `old_name` does not exist.
    pub fn rename_column(&mut self, old_name: &str, new_name: &str) -> StoreResult<()> {
        self.columns.rename(old_name, new_name)?;
        Ok(())
    }

    pub fn get_column(&self, name: &str) -> StoreResult<ColumnInfo> {
        Ok(self.columns.get(name)?.info().clone())
    }

    /// Metadata of all columns, ordered by name.
    pub fn list_columns(&self) -> Vec<ColumnInfo> {
        self.columns.list()
    }

    // ---------------------------------------------------------------
    // Property values
    // ---------------------------------------------------------------

    /// Store `value` in column `name` for the node at `path`.
    ///
    /// Checks, in order: the column exists, the node exists, the value
    /// conforms to the column type. `Value::Null` always conforms.
    pub fn set_property_value(&mut self, path: &Path, name: &str, value: Value) -> StoreResult<()> {
        require_name(name, "name")?;
        self.columns.get(name)?;
        let id = self.node_id(path)?;
        self.columns.get_mut(name)?.set(id, value)?;
        debug!(%path, column = name, "set property value");
        Ok(())
    }

    /// The value in column `name` for the node at `path`, `None` if absent.
    pub fn get_property_value(&self, path: &Path, name: &str) -> StoreResult<Option<Value>> {
        require_name(name, "name")?;
        let column = self.columns.get(name)?;
        let id = self.node_id(path)?;
        Ok(column.get(&id).cloned())
    }

    /// Remove the value in column `name` for the node at `path`.
    ///
    /// Clearing an absent value is not an error.
    pub fn clear_property_value(&mut self, path: &Path, name: &str) -> StoreResult<()> {
        require_name(name, "name")?;
        self.columns.get(name)?;
        let id = self.node_id(path)?;
        self.columns.get_mut(name)?.clear(&id);
        debug!(%path, column = name, "cleared property value");
        Ok(())
    }

    /// Copy a value between (node, column) pairs, leaving the source intact.
    ///
    /// An absent source value clears the destination.
    pub fn copy_property_value(
        &mut self,
        source: &Path,
        source_name: &str,
        destination: &Path,
        destination_name: &str,
    ) -> StoreResult<()> {
        self.transfer(source, source_name, destination, destination_name, false)
    }

    /// Like [`copy_property_value`](Self::copy_property_value), but the
    /// source value is cleared once the destination has been written.
    pub fn move_property_value(
        &mut self,
        source: &Path,
        source_name: &str,
        destination: &Path,
        destination_name: &str,
    ) -> StoreResult<()> {
        self.transfer(source, source_name, destination, destination_name, true)
    }

    fn transfer(
        &mut self,
        source: &Path,
        source_name: &str,
        destination: &Path,
        destination_name: &str,
        clear_source: bool,
    ) -> StoreResult<()> {
        require_name(source_name, "source_name")?;
        require_name(destination_name, "destination_name")?;

        // Columns before nodes, sources before destinations.
        let source_column = self.columns.get(source_name)?;
        let destination_column = self.columns.get(destination_name)?;
        let source_id = self.node_id(source)?;
        let destination_id = self.node_id(destination)?;

        let value = source_column.get(&source_id).cloned();
        if let Some(v) = &value {
            destination_column.check(destination_id, v)?;
        }
        if source_id == destination_id && source_name == destination_name {
            return Ok(());
        }

        let target = self.columns.get_mut(destination_name)?;
        match value {
            Some(v) => {
                target.set(destination_id, v)?;
            }
            None => {
                target.clear(&destination_id);
            }
        }
        if clear_source {
            self.columns.get_mut(source_name)?.clear(&source_id);
        }

        debug!(
            from = %source,
            from_column = source_name,
            to = %destination,
            to_column = destination_name,
            moved = clear_source,
            "transferred property value"
        );
        Ok(())
    }

    // ---------------------------------------------------------------
    // Maintenance
    // ---------------------------------------------------------------

    /// Identities of every node currently in the hierarchy.
    pub(crate) fn live_ids(&self) -> StoreResult<HashSet<NodeId>> {
        let root = Path::root();
        let mut live: HashSet<NodeId> = self
            .hierarchy
            .descendants(&root, TraversalOrder::DepthFirst)?
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        live.insert(self.node_id(&root)?);
        Ok(live)
    }

    /// Drop column entries whose node no longer exists.
    ///
    /// Orphaned entries are never visible through reads, because removed
    /// identities are never handed out again; this only reclaims memory.
    /// Returns the number of dropped entries.
    pub fn compact(&mut self) -> StoreResult<usize> {
        let live = self.live_ids()?;
        let dropped: usize = self
            .columns
            .iter_mut()
            .map(|column| column.retain(|id| live.contains(id)))
            .sum();
        debug!(dropped, "compacted columns");
        Ok(dropped)
    }

    fn node_id(&self, path: &Path) -> StoreResult<NodeId> {
        self.hierarchy
            .resolve(path)?
            .ok_or_else(|| StoreError::MissingNode(path.clone()))
    }
}

fn require_name(name: &str, argument: &'static str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::MissingArgument(argument));
    }
    Ok(())
}
