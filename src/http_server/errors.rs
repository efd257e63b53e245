//! HTTP Server Errors

use thiserror::Error;

use crate::rest_api::RestError;

/// Result type for server setup
pub type ServerResult<T> = Result<T, ServerError>;

/// Server setup and startup errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Two collections share a mount name
    #[error("Duplicate collection: {0}")]
    DuplicateCollection(String),

    /// A store could not be registered
    #[error("Cannot register collection '{name}': {source}")]
    Registration {
        name: String,
        #[source]
        source: RestError,
    },

    /// Bind address does not parse
    #[error("Invalid socket address: {0}")]
    InvalidAddress(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
