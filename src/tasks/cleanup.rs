//! Expiry Sweep Task
//!
//! Background task that periodically removes invalid entries from both tiers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TieredCacheStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// `get` only evicts entries it happens to touch, so this sweep bounds
/// how long stale records occupy the persistent tier.
///
/// # Arguments
/// * `cache` - shared reference to the store
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<TieredCacheStore>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup_expired()
            };

            debug!("Expiry sweep finished, {} entries removed", removed);
        }
    })
}
