//! Error types for the form server
//!
//! Provides unified error handling using thiserror. Cache errors never reach
//! the HTTP layer; store and request errors do, through `ApiError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

// == Cache Error Enum ==
/// Errors raised by a cache backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is empty or too long
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Capacity reached while inserting a new key
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Backend temporarily unreachable; the write may succeed if retried
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    /// Internal backend failure (e.g. poisoned lock)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Returns true when the failure is connectivity-flavored and worth a retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, CacheError::Unavailable(_))
    }
}

// == Store Error ==
/// Classification of store-of-record failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The store could not be reached
    Unavailable,
    /// The store did not answer in time
    Timeout,
    /// The write conflicts with existing data
    Conflict,
    /// Anything else
    Internal,
}

/// Error returned by a store-of-record implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind:?}: {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Conflict, message)
    }

    /// Unavailable and Timeout failures are connectivity issues.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            StoreErrorKind::Unavailable | StoreErrorKind::Timeout
        )
    }
}

// == API Error Enum ==
/// Error type surfaced by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or invalid bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated user does not own the record
    #[error("Forbidden")]
    Forbidden,

    /// Record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Store-of-record failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Response body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Store(err) => {
                if err.is_transient() {
                    error!("Store-of-record unreachable: {}", err);
                } else {
                    error!("Store-of-record failure: {}", err);
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
            ApiError::Serialization(err) => {
                error!("Failed to encode response: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
