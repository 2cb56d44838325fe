use std::sync::{Arc, RwLock};

use treesor_hierarchy::{Hierarchy, InMemoryHierarchy};

use crate::error::{StoreError, StoreResult};
use crate::store::TreeStore;

/// A cloneable, thread-safe handle to a [`TreeStore`].
///
/// Reads run concurrently; each mutating closure runs with exclusive access,
/// so every store operation is atomic with respect to the others.
pub struct SharedTreeStore<H = InMemoryHierarchy> {
    inner: Arc<RwLock<TreeStore<H>>>,
}

impl<H> Clone for SharedTreeStore<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: Hierarchy> SharedTreeStore<H> {
    pub fn new(store: TreeStore<H>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Run `f` with shared access to the store.
    pub fn read<T>(&self, f: impl FnOnce(&TreeStore<H>) -> StoreResult<T>) -> StoreResult<T> {
        let guard = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("tree store lock poisoned".into()))?;
        f(&guard)
    }

    /// Run `f` with exclusive access to the store.
    pub fn write<T>(
        &self,
        f: impl FnOnce(&mut TreeStore<H>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("tree store lock poisoned".into()))?;
        f(&mut guard)
    }
}

impl<H: Hierarchy> From<TreeStore<H>> for SharedTreeStore<H> {
    fn from(store: TreeStore<H>) -> Self {
        Self::new(store)
    }
}
