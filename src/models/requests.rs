//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::Params;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `category`: The data category, which decides TTL and schema version
/// - `payload`: The response body to cache
/// - `params`: Named primitive parameters identifying the resource
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub category: String,
    pub payload: Value,
    #[serde(default)]
    pub params: Params,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_category(&self.category)
    }
}

/// Request body for lookups and single-entry removal (POST /get, POST /del)
#[derive(Debug, Clone, Deserialize)]
pub struct EntryRequest {
    pub category: String,
    #[serde(default)]
    pub params: Params,
}

impl EntryRequest {
    pub fn validate(&self) -> Option<String> {
        validate_category(&self.category)
    }
}

fn validate_category(category: &str) -> Option<String> {
    if category.is_empty() {
        return Some("Category cannot be empty".to_string());
    }
    None
}
