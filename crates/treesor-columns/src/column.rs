use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use treesor_types::{NodeId, Value, ValueType};

use crate::error::{ColumnError, ColumnResult};

/// Column metadata: a unique name and an immutable declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub value_type: ValueType,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// A sparse, typed mapping from node identity to value.
///
/// Absence of an entry means "no value" and is distinct from a stored
/// [`Value::Null`]. Every stored value conforms to the declared type.
#[derive(Clone, Debug)]
pub struct Column {
    info: ColumnInfo,
    values: HashMap<NodeId, Value>,
}

impl Column {
    pub fn new(info: ColumnInfo) -> Self {
        Self {
            info,
            values: HashMap::new(),
        }
    }

    pub fn info(&self) -> &ColumnInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn value_type(&self) -> ValueType {
        self.info.value_type
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.info.name = name;
    }

    /// Number of stored entries, orphans included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check that `value` may be stored for `node` without storing it.
    pub fn check(&self, node: NodeId, value: &Value) -> ColumnResult<()> {
        if let Some(actual) = value.value_type() {
            if actual != self.info.value_type {
                return Err(ColumnError::TypeMismatch {
                    value: value.to_string(),
                    value_type: actual,
                    property: self.info.name.clone(),
                    node,
                    expected: self.info.value_type,
                });
            }
        }
        if !value.is_finite() {
            return Err(ColumnError::NonFiniteValue {
                value: value.to_string(),
                property: self.info.name.clone(),
                node,
            });
        }
        Ok(())
    }

    pub fn get(&self, node: &NodeId) -> Option<&Value> {
        self.values.get(node)
    }

    /// Store `value` for `node`, returning the previous entry.
    ///
    /// The column is unchanged if the value does not conform.
    pub fn set(&mut self, node: NodeId, value: Value) -> ColumnResult<Option<Value>> {
        self.check(node, &value)?;
        Ok(self.values.insert(node, value))
    }

    /// Remove the entry for `node`. Clearing an absent entry is not an error.
    pub fn clear(&mut self, node: &NodeId) -> Option<Value> {
        self.values.remove(node)
    }

    /// All entries, in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = (&NodeId, &Value)> {
        self.values.iter()
    }

    /// Keep only entries whose node satisfies `keep`. Returns the number
    /// of dropped entries.
    pub fn retain(&mut self, mut keep: impl FnMut(&NodeId) -> bool) -> usize {
        let before = self.values.len();
        self.values.retain(|id, _| keep(id));
        before - self.values.len()
    }
}
