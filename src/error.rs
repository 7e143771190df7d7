//! Error types for the query cache layer
//!
//! Provides unified error handling using thiserror.
//!
//! The store itself has no error type: unknown keys read as absent and
//! invalidation is idempotent, so only the query layer can fail.

use thiserror::Error;

// == Query Error Enum ==
/// Unified error type for cached query resolution.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The caller supplied an empty query key
    #[error("query key must not be empty")]
    EmptyKey,

    /// The producer failed; already forwarded to the error reporter
    #[error("producer failed for key '{key}'")]
    Producer {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// A cached value did not deserialize as the requested type.
    ///
    /// This is how a key-namespacing violation surfaces: some caller wrote a
    /// different shape under the same cache key.
    #[error("cached value for key '{key}' does not match the requested type")]
    Shape {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A produced value could not be encoded for storage
    #[error("failed to encode value for key '{key}'")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the query cache layer.
pub type Result<T> = std::result::Result<T, QueryError>;
