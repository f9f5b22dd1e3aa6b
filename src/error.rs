//! Error types for the response cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A parameter value was an array or object and cannot be encoded into a key
    #[error("Unsupported value for parameter '{name}': {kind} is not a primitive")]
    UnsupportedParam { name: String, kind: &'static str },

    /// Category name is empty or contains the key separator
    #[error("Invalid category name: '{0}'")]
    InvalidCategory(String),

    /// Persistent key prefix would overlap keys owned by others
    #[error("Invalid cache namespace: '{0}'")]
    InvalidNamespace(String),

    /// No policy registered for the category
    #[error("No cache policy registered for category: {0}")]
    PolicyMissing(String),

    /// Nothing cached under the key
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Durable tier I/O failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Payload or record could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Persistence(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::UnsupportedParam { .. }
            | CacheError::InvalidCategory(_)
            | CacheError::PolicyMissing(_)
            | CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Serialization(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::InvalidNamespace(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
