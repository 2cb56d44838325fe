//! The column registry: name uniqueness and type stability.

use std::collections::BTreeMap;

use tracing::debug;
use treesor_types::ValueType;

use crate::column::{Column, ColumnInfo};
use crate::error::{ColumnError, ColumnResult};

/// All columns of one store, keyed by case-sensitive name.
///
/// A column's declared type never changes; to change it the column must be
/// removed (dropping its values) and created again.
#[derive(Clone, Debug, Default)]
pub struct ColumnRegistry {
    columns: BTreeMap<String, Column>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Create a column, or return the existing one if it has the same type.
    pub fn create(&mut self, name: &str, value_type: ValueType) -> ColumnResult<ColumnInfo> {
        if name.is_empty() {
            return Err(ColumnError::MissingArgument("name"));
        }
        if let Some(existing) = self.columns.get(name) {
            if existing.value_type() != value_type {
                return Err(ColumnError::TypeConflict {
                    name: name.to_string(),
                    existing: existing.value_type(),
                });
            }
            return Ok(existing.info().clone());
        }

        let info = ColumnInfo::new(name, value_type);
        self.columns
            .insert(name.to_string(), Column::new(info.clone()));
        debug!(column = name, %value_type, "created column");
        Ok(info)
    }

    /// Remove a column and all its values. Returns `false` if it did not exist.
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.columns.remove(name).is_some();
        if removed {
            debug!(column = name, "removed column");
        }
        removed
    }

    /// Rename a column, keeping its type and values.
    ///
    /// Returns `Ok(false)` without changes if `old_name` does not exist.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> ColumnResult<bool> {
        if new_name.is_empty() {
            return Err(ColumnError::MissingArgument("new_name"));
        }
        if !self.columns.contains_key(old_name) {
            return Ok(false);
        }
        if old_name == new_name {
            return Ok(true);
        }
        if self.columns.contains_key(new_name) {
            return Err(ColumnError::DuplicateName(new_name.to_string()));
        }

        if let Some(mut column) = self.columns.remove(old_name) {
            column.set_name(new_name.to_string());
            self.columns.insert(new_name.to_string(), column);
        }
        debug!(from = old_name, to = new_name, "renamed column");
        Ok(true)
    }

    /// Look up a column by name.
    pub fn get(&self, name: &str) -> ColumnResult<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| ColumnError::MissingProperty(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> ColumnResult<&mut Column> {
        self.columns
            .get_mut(name)
            .ok_or_else(|| ColumnError::MissingProperty(name.to_string()))
    }

    /// Metadata of all columns, ordered by name.
    pub fn list(&self) -> Vec<ColumnInfo> {
        self.columns.values().map(|c| c.info().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treesor_types::{NodeId, Value};

    #[test]
    fn create_column() {
        let mut reg = ColumnRegistry::new();
        let info = reg.create("p", ValueType::String).unwrap();
        assert_eq!(info.name, "p");
        assert_eq!(info.value_type, ValueType::String);
        assert_eq!(reg.list(), vec![info]);
    }

    #[test]
    fn create_twice_with_same_type_is_idempotent() {
        let mut reg = ColumnRegistry::new();
        let first = reg.create("p", ValueType::String).unwrap();
        let node = NodeId::generate();
        reg.get_mut("p").unwrap().set(node, Value::from("x")).unwrap();

        let second = reg.create("p", ValueType::String).unwrap();
        assert_eq!(first, second);
        assert_eq!(reg.len(), 1);
        // Existing values survive.
        assert_eq!(reg.get("p").unwrap().get(&node), Some(&Value::from("x")));
    }

    #[test]
    fn create_with_different_type_conflicts() {
        let mut reg = ColumnRegistry::new();
        reg.create("p", ValueType::String).unwrap();
        let err = reg.create("p", ValueType::Integer).unwrap_err();
        assert_eq!(
            err.to_string(),
            "column 'p' already defined with type 'string'"
        );
        assert_eq!(reg.get("p").unwrap().value_type(), ValueType::String);
    }

    #[test]
    fn create_requires_name() {
        let mut reg = ColumnRegistry::new();
        assert_eq!(
            reg.create("", ValueType::String),
            Err(ColumnError::MissingArgument("name"))
        );
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut reg = ColumnRegistry::new();
        reg.create("p", ValueType::String).unwrap();
        reg.create("P", ValueType::Integer).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn remove_missing_column_returns_false() {
        let mut reg = ColumnRegistry::new();
        assert!(!reg.remove("p"));
    }

    #[test]
    fn remove_then_recreate_with_new_type() {
        let mut reg = ColumnRegistry::new();
        reg.create("p", ValueType::String).unwrap();
        reg.get_mut("p")
            .unwrap()
            .set(NodeId::generate(), Value::from("x"))
            .unwrap();
        assert!(reg.remove("p"));
        assert!(reg.is_empty());

        reg.create("p", ValueType::Integer).unwrap();
        assert!(reg.get("p").unwrap().is_empty());
    }

    #[test]
    fn rename_missing_column_is_noop() {
        let mut reg = ColumnRegistry::new();
        reg.create("x", ValueType::Bool).unwrap();
        assert!(!reg.rename("p", "q").unwrap());
        assert_eq!(reg.list(), vec![ColumnInfo::new("x", ValueType::Bool)]);
    }

    #[test]
    fn rename_keeps_type_and_values() {
        let mut reg = ColumnRegistry::new();
        reg.create("p", ValueType::Integer).unwrap();
        let node = NodeId::generate();
        reg.get_mut("p").unwrap().set(node, Value::from(3)).unwrap();

        assert!(reg.rename("p", "q").unwrap());
        assert!(!reg.contains("p"));
        let q = reg.get("q").unwrap();
        assert_eq!(q.name(), "q");
        assert_eq!(q.value_type(), ValueType::Integer);
        assert_eq!(q.get(&node), Some(&Value::from(3)));
    }

    #[test]
    fn rename_onto_taken_name_fails() {
        let mut reg = ColumnRegistry::new();
        reg.create("p", ValueType::String).unwrap();
        reg.create("q", ValueType::String).unwrap();
        assert_eq!(
            reg.rename("p", "q"),
            Err(ColumnError::DuplicateName("q".into()))
        );
        assert!(reg.contains("p"));
    }

    #[test]
    fn get_missing_column() {
        let reg = ColumnRegistry::new();
        let err = reg.get("p").unwrap_err();
        assert_eq!(err.to_string(), "property 'p' doesn't exist");
    }
}
