use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use treesor_hierarchy::TraversalOrder;
use treesor_types::ValueType;

use crate::error::{StoreError, StoreResult};
use crate::snapshot::SnapshotFormat;

/// Construction settings for a [`TreeStore`](crate::TreeStore).
///
/// Every field has a default, so an empty TOML document is a valid config.
///
/// ```toml
/// snapshot_path = "tree.json"
/// snapshot_format = "json"
/// traversal = "breadth_first"
///
/// [[columns]]
/// name = "title"
/// value_type = "string"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Where the store is persisted between runs.
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_format: SnapshotFormat,
    /// Default order for descendant listings.
    pub traversal: TraversalOrder,
    /// Columns created when the store is constructed.
    pub columns: Vec<ColumnSpec>,
}

/// A column declared in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub value_type: ValueType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

impl StoreConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        toml::from_str(text).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render the config as TOML.
    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.snapshot_format, SnapshotFormat::Json);
        assert_eq!(config.traversal, TraversalOrder::DepthFirst);
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn parse_full_document() {
        let config = StoreConfig::from_toml_str(
            r#"
            snapshot_path = "data/tree.bin"
            snapshot_format = "binary"
            traversal = "breadth_first"

            [[columns]]
            name = "title"
            value_type = "string"

            [[columns]]
            name = "size"
            value_type = "integer"
            "#,
        )
        .unwrap();

        assert_eq!(config.snapshot_path, Some(PathBuf::from("data/tree.bin")));
        assert_eq!(config.snapshot_format, SnapshotFormat::Binary);
        assert_eq!(config.traversal, TraversalOrder::BreadthFirst);
        assert_eq!(
            config.columns,
            vec![
                ColumnSpec::new("title", ValueType::String),
                ColumnSpec::new("size", ValueType::Integer),
            ]
        );
    }

    #[test]
    fn unknown_value_type_is_rejected() {
        let err = StoreConfig::from_toml_str(
            r#"
            [[columns]]
            name = "x"
            value_type = "decimal"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("treesor.toml");
        std::fs::write(&path, "traversal = \"breadth_first\"\n").unwrap();
        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.traversal, TraversalOrder::BreadthFirst);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StoreConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn toml_round_trip() {
        let config = StoreConfig {
            snapshot_path: Some("tree.json".into()),
            columns: vec![ColumnSpec::new("flag", ValueType::Bool)],
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(StoreConfig::from_toml_str(&text).unwrap(), config);
    }
}
