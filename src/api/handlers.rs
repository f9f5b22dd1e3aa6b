//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

use crate::cache::{key, CategoryPolicyTable, StatsReport, TieredCacheStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, EntryRequest, GetResponse, HealthResponse, PolicyResponse,
    SetRequest, SetResponse,
};
use crate::persist::{DurableNamespace, FileNamespace, MemoryNamespace};

/// Application state shared across all handlers.
///
/// Contains the cache store wrapped in Arc<RwLock<>> for thread-safe access.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RwLock<TieredCacheStore>>,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: TieredCacheStore) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the policy table and opens the persistent tier, file-backed
    /// when `cache_file` is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let policies = CategoryPolicyTable::from_config(config)?;

        let persistent: Box<dyn DurableNamespace> = match &config.cache_file {
            Some(path) => Box::new(FileNamespace::open(path)?),
            None => {
                info!("No CACHE_FILE set, persistent tier kept in memory");
                Box::new(MemoryNamespace::new())
            }
        };

        let cache =
            TieredCacheStore::new(policies, persistent).with_prefix(config.namespace.clone())?;
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /set
///
/// Caches a payload under a category and parameter set.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    cache.set(&req.category, &req.payload, &req.params)?;

    Ok(Json(SetResponse::new(key::encode(&req.category, &req.params)?)))
}

/// Handler for POST /get
///
/// Looks up a cached payload. Misses of any kind are 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Json(req): Json<EntryRequest>,
) -> Result<Json<GetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    let key = key::encode(&req.category, &req.params)?;

    // Write lock: lookups may promote or evict
    let mut cache = state.cache.write().await;
    match cache.get::<Value>(&req.category, &req.params)? {
        Some(payload) => Ok(Json(GetResponse::new(req.category, key, payload))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for POST /del
///
/// Clears one entry from both tiers. Idempotent.
pub async fn delete_handler(
    State(state): State<AppState>,
    Json(req): Json<EntryRequest>,
) -> Result<Json<DeleteResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    let key = key::encode(&req.category, &req.params)?;

    let mut cache = state.cache.write().await;
    cache.clear(&req.category, &req.params)?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /cache/clear
pub async fn clear_all_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.write().await;
    Json(ClearResponse::cleared(cache.clear_all()))
}

/// Handler for POST /cache/cleanup
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.write().await;
    Json(ClearResponse::swept(cache.cleanup_expired()))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsReport> {
    let cache = state.cache.read().await;
    Json(cache.stats())
}

/// Handler for GET /cache/policies
pub async fn policies_handler(State(state): State<AppState>) -> Json<Vec<PolicyResponse>> {
    let cache = state.cache.read().await;
    let policies = cache
        .policies()
        .sorted()
        .into_iter()
        .map(|(category, policy)| PolicyResponse::new(category, policy))
        .collect();
    Json(policies)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
