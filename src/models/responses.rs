//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CategoryPolicy;

/// Response body for a cache hit (POST /get)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub category: String,
    /// The encoded cache key
    pub key: String,
    /// The cached response body
    pub payload: Value,
}

impl GetResponse {
    pub fn new(category: impl Into<String>, key: impl Into<String>, payload: Value) -> Self {
        Self {
            category: category.into(),
            key: key.into(),
            payload,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' cached successfully", key),
            key,
        }
    }
}

/// Response body for single-entry removal (POST /del)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' cleared", key),
            key,
        }
    }
}

/// Response body for bulk removal (DELETE /cache/clear, POST /cache/cleanup)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub entries_removed: usize,
}

impl ClearResponse {
    pub fn cleared(entries_removed: usize) -> Self {
        Self {
            message: "Cache cleared successfully".to_string(),
            entries_removed,
        }
    }

    pub fn swept(entries_removed: usize) -> Self {
        Self {
            message: "Expired entries removed".to_string(),
            entries_removed,
        }
    }
}

/// One row of GET /cache/policies
#[derive(Debug, Clone, Serialize)]
pub struct PolicyResponse {
    pub category: String,
    pub schema_version: String,
    pub ttl_seconds: u64,
}

impl PolicyResponse {
    pub fn new(category: impl Into<String>, policy: &CategoryPolicy) -> Self {
        Self {
            category: category.into(),
            schema_version: policy.schema_version.clone(),
            ttl_seconds: policy.ttl_millis / 1000,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
