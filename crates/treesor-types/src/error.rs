use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid path segment {segment:?}: {reason}")]
    InvalidSegment { segment: String, reason: String },

    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("unknown value type: {0}")]
    UnknownValueType(String),

    #[error("cannot parse {input:?} as {expected}: {reason}")]
    InvalidValue {
        input: String,
        expected: String,
        reason: String,
    },
}
