//! Error types for table configuration.
//!
//! Runtime input (page requests, widths, scroll offsets) never fails: it is
//! clamped or replaced by a default. Errors are reserved for configuration
//! that cannot be interpreted at all, such as two columns sharing one key.

use thiserror::Error;

/// Errors raised while building table configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two column definitions resolve to the same stable key.
    #[error("duplicate column key: {0}")]
    DuplicateColumnKey(String),

    /// A JSON row carries none of the recognised identifier fields.
    #[error("row has no id field (looked for id, key, _id, rowId)")]
    MissingRowId,

    /// A JSON row was not an object.
    #[error("row must be a JSON object, got {0}")]
    NotAnObject(String),

    /// A sort or filter references a column that does not exist.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
