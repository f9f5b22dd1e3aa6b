//! statcache - Tiered response cache for a game-statistics dashboard
//!
//! A fast in-process tier in front of a durable key-value namespace, with
//! per-category TTL and schema-version invalidation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod persist;
pub mod tasks;

pub use api::AppState;
pub use cache::TieredCacheStore;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
