//! # REST API Errors
//!
//! Error types for the request translator.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::{KeyKind, StoreError};

/// Result type for REST operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum RestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Structurally invalid request
    #[error("{0}")]
    Validation(String),

    /// Request body could not be decoded
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Missing required parameter
    #[error("Missing required parameter: {0}")]
    MissingParam(String),

    /// Invalid query parameter
    #[error("Invalid query parameter: {0}")]
    InvalidQueryParam(String),

    /// Path identifier does not parse as the store's key type
    #[error("Invalid key '{raw}' for {kind} key")]
    InvalidKey { raw: String, kind: KeyKind },

    /// No acceptable output format
    #[error("Not acceptable: {0}")]
    NotAcceptable(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store declares a key type with no coercion rule
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(KeyKind),

    /// Downstream store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Output could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            RestError::Validation(_) => StatusCode::BAD_REQUEST,
            RestError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RestError::MissingParam(_) => StatusCode::BAD_REQUEST,
            RestError::InvalidQueryParam(_) => StatusCode::BAD_REQUEST,
            RestError::InvalidKey { .. } => StatusCode::BAD_REQUEST,

            // 406 Not Acceptable
            RestError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,

            // 500 Internal Server Error
            RestError::UnsupportedKeyType(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the request itself was at fault
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::Serialization(err.to_string())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<RestError> for ErrorResponse {
    fn from(err: RestError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RestError::Validation("Entity expected".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RestError::MissingParam("id".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RestError::NotAcceptable("text/html".to_string()).status_code(),
            StatusCode::NOT_ACCEPTABLE
        );
        assert_eq!(
            RestError::UnsupportedKeyType(KeyKind::Other("uuid")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_propagation() {
        let rest_err = RestError::from(StoreError::Backend("down".to_string()));
        assert_eq!(rest_err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!rest_err.is_client_error());
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let body = ErrorResponse::from(RestError::Validation("Entity expected".to_string()));
        assert_eq!(body.error, "Entity expected");
        assert_eq!(body.code, 400);
    }
}
