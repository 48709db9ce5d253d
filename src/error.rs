//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::cache::ValueKind;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// Absence of a key is a normal return value (`None`, `0`, empty
/// collection) everywhere except where an operation requires the key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Rejected argument: negative magnitude, overflow, oversize key/value,
    /// malformed TTL or out-of-range index
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The key holds a different kind of value than the operation expects
    #[error("Type mismatch for key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// Key required by the operation does not exist
    #[error("Key not found: {0}")]
    NotFound(String),
}

impl CacheError {
    /// Shorthand for building an `InvalidArgument` error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        CacheError::InvalidArgument(msg.into())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
