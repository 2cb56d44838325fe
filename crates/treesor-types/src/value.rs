use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The declared type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Integer,
    Float,
    String,
    Bytes,
    Timestamp,
}

impl ValueType {
    /// All supported value types.
    pub const ALL: [ValueType; 6] = [
        Self::Bool,
        Self::Integer,
        Self::Float,
        Self::String,
        Self::Bytes,
        Self::Timestamp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypeError::UnknownValueType(s.to_string()))
    }
}

/// A property value.
///
/// The set of kinds is closed so a column's declared [`ValueType`] can be
/// checked at the store boundary. `Null` is an explicit stored null: it is
/// accepted by every column and is distinct from "no entry".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// The runtime type of this value, or `None` for `Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueType::Bool),
            Self::Integer(_) => Some(ValueType::Integer),
            Self::Float(_) => Some(ValueType::Float),
            Self::String(_) => Some(ValueType::String),
            Self::Bytes(_) => Some(ValueType::Bytes),
            Self::Timestamp(_) => Some(ValueType::Timestamp),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if this value may be stored in a column of type `ty`.
    pub fn conforms_to(&self, ty: ValueType) -> bool {
        self.value_type().map_or(true, |t| t == ty)
    }

    /// Returns `false` for a NaN or infinite float.
    ///
    /// Such floats have no JSON form and cannot be stored in a column.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Float(x) => x.is_finite(),
            _ => true,
        }
    }

    /// Name of the runtime type, `"null"` for `Null`.
    pub fn type_name(&self) -> &'static str {
        self.value_type().map_or("null", |t| t.name())
    }

    /// Parse textual input as a value of the given type.
    ///
    /// Booleans are `true`/`false`, bytes are hex, timestamps are RFC 3339.
    /// The literal `null` is never interpreted here; callers that want an
    /// explicit null pass [`Value::Null`].
    pub fn parse_as(ty: ValueType, text: &str) -> Result<Value, TypeError> {
        let invalid = |reason: String| TypeError::InvalidValue {
            input: text.to_string(),
            expected: ty.name().to_string(),
            reason,
        };
        let value = match ty {
            ValueType::Bool => Self::Bool(text.parse().map_err(|e| invalid(format!("{e}")))?),
            ValueType::Integer => {
                Self::Integer(text.parse().map_err(|e| invalid(format!("{e}")))?)
            }
            ValueType::Float => {
                let x: f64 = text.parse().map_err(|e| invalid(format!("{e}")))?;
                if !x.is_finite() {
                    return Err(invalid("value must be finite".into()));
                }
                Self::Float(x)
            }
            ValueType::String => Self::String(text.to_string()),
            ValueType::Bytes => Self::Bytes(hex::decode(text).map_err(|e| invalid(e.to_string()))?),
            ValueType::Timestamp => Self::Timestamp(
                DateTime::parse_from_rfc3339(text)
                    .map_err(|e| invalid(e.to_string()))?
                    .with_timezone(&Utc),
            ),
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Bytes(b) => f.write_str(&hex::encode(b)),
            Self::Timestamp(t) => f.write_str(&t.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}
