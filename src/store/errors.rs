//! # Store Errors
//!
//! Failures a store implementation reports back to the translator.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
///
/// The translator never inspects these beyond logging them; every variant
/// surfaces as a server-side fault.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Insert of a key that is already present
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Entity carries no usable key
    #[error("Entity has no usable key field '{0}'")]
    MissingKey(String),

    /// Store refused the mutation
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Entity could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}
