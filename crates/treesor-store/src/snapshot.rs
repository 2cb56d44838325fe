//! Whole-store snapshots.
//!
//! A [`StoreSnapshot`] captures every node binding and every column with its
//! live values. Restoring a snapshot preserves node identities, so property
//! values survive a save/load cycle unchanged. Files are written atomically:
//! the encoded snapshot goes to a temporary file in the target directory,
//! which then replaces the target.

use std::fs;
use std::io::Write;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};
use tracing::debug;
use treesor_hierarchy::{Hierarchy, InMemoryHierarchy, TraversalOrder};
use treesor_types::{NodeId, Path, Value, ValueType};

use crate::error::{StoreError, StoreResult};
use crate::store::TreeStore;

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk encoding of a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Compact bincode.
    Binary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    /// Node bindings, parents before children.
    pub nodes: Vec<NodeEntry>,
    /// Columns ordered by name.
    pub columns: Vec<ColumnSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub path: Path,
    pub id: NodeId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    pub name: String,
    pub value_type: ValueType,
    /// Values of live nodes, ordered by node identity.
    pub values: Vec<ValueEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    pub node: NodeId,
    pub value: Value,
}

impl StoreSnapshot {
    pub fn encode(&self, format: SnapshotFormat) -> StoreResult<Vec<u8>> {
        match format {
            SnapshotFormat::Json => serde_json::to_vec_pretty(self)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            SnapshotFormat::Binary => {
                bincode::serialize(self).map_err(|e| StoreError::Serialization(e.to_string()))
            }
        }
    }

    pub fn decode(bytes: &[u8], format: SnapshotFormat) -> StoreResult<Self> {
        let snapshot: Self = match format {
            SnapshotFormat::Json => serde_json::from_slice(bytes)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            SnapshotFormat::Binary => bincode::deserialize(bytes)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
        };
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::Serialization(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}

/// Write `snapshot` to `path`, replacing any existing file atomically.
pub fn save_snapshot(
    path: impl AsRef<FsPath>,
    snapshot: &StoreSnapshot,
    format: SnapshotFormat,
) -> StoreResult<()> {
    let path = path.as_ref();
    let bytes = snapshot.encode(format)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => FsPath::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;

    debug!(path = %path.display(), len = bytes.len(), ?format, "saved snapshot");
    Ok(())
}

/// Read a snapshot previously written by [`save_snapshot`].
pub fn load_snapshot(path: impl AsRef<FsPath>, format: SnapshotFormat) -> StoreResult<StoreSnapshot> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let snapshot = StoreSnapshot::decode(&bytes, format)?;
    debug!(
        path = %path.display(),
        nodes = snapshot.nodes.len(),
        columns = snapshot.columns.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

impl<H: Hierarchy> TreeStore<H> {
    /// Capture the store's current state.
    ///
    /// Column entries of nodes that no longer exist are left out.
    pub fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        let root = Path::root();
        let root_id = self.get_item(&root)?.id;
        let mut nodes = vec![NodeEntry {
            path: root.clone(),
            id: root_id,
        }];
        nodes.extend(
            self.hierarchy()
                .descendants(&root, TraversalOrder::DepthFirst)?
                .into_iter()
                .map(|(path, id)| NodeEntry { path, id }),
        );

        let live = self.live_ids()?;
        let columns = self
            .columns()
            .iter()
            .map(|column| {
                let mut values: Vec<ValueEntry> = column
                    .entries()
                    .filter(|(node, _)| live.contains(node))
                    .map(|(node, value)| ValueEntry {
                        node: *node,
                        value: value.clone(),
                    })
                    .collect();
                values.sort_by_key(|entry| entry.node);
                ColumnSnapshot {
                    name: column.name().to_string(),
                    value_type: column.value_type(),
                    values,
                }
            })
            .collect();

        Ok(StoreSnapshot {
            version: SNAPSHOT_VERSION,
            nodes,
            columns,
        })
    }

    /// Rebuild a store from `snapshot` on top of an empty `hierarchy`.
    ///
    /// Node identities are restored exactly. A root node is added if the
    /// snapshot has none.
    pub fn from_snapshot(mut hierarchy: H, snapshot: StoreSnapshot) -> StoreResult<Self> {
        for entry in &snapshot.nodes {
            hierarchy.add(&entry.path, entry.id)?;
        }
        let mut store = Self::new(hierarchy)?;

        for column in snapshot.columns {
            store.create_column(&column.name, column.value_type)?;
            let target = store.columns_mut().get_mut(&column.name)?;
            for entry in column.values {
                target.set(entry.node, entry.value)?;
            }
        }
        Ok(store)
    }

    /// Snapshot the store and write it to `path`.
    pub fn save(&self, path: impl AsRef<FsPath>, format: SnapshotFormat) -> StoreResult<()> {
        save_snapshot(path, &self.snapshot()?, format)
    }
}

impl TreeStore<InMemoryHierarchy> {
    /// Load an in-memory store from a snapshot file.
    pub fn load(path: impl AsRef<FsPath>, format: SnapshotFormat) -> StoreResult<Self> {
        Self::from_snapshot(InMemoryHierarchy::new(), load_snapshot(path, format)?)
    }
}
