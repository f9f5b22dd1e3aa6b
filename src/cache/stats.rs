//! Cache Statistics Module
//!
//! Counters kept by the store plus the report that aggregates both tiers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::cache::{key, TieredCacheStore};

// == Cache Stats ==
/// Running counters updated by store operations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from either tier
    pub hits: u64,
    /// Lookups that found nothing valid
    pub misses: u64,
    /// Persistent-tier entries copied into the fast tier
    pub promotions: u64,
    /// Invalid entries removed on read or by the sweep
    pub evictions: u64,
    /// Persistent-tier writes or removals that failed
    pub persist_failures: u64,
}

impl CacheStats {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_persist_failure(&mut self) {
        self.persist_failures += 1;
    }
}

// == Stats Report ==
/// Snapshot of both tiers for operators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    /// Entries held in the fast tier
    pub fast_count: usize,
    /// Records under this cache's prefix in the persistent tier
    pub persistent_count: usize,
    /// Human-readable size of those records, e.g. "1.50 KB"
    pub approx_byte_size: String,
    /// Same size in bytes
    pub approx_bytes: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub promotions: u64,
    pub evictions: u64,
    pub persist_failures: u64,
    /// Fast-tier key to expiry time (RFC 3339), live entries only
    pub items: BTreeMap<String, String>,
}

impl StatsReport {
    // == Collect ==
    /// Aggregates counts and sizes across both tiers without modifying them.
    pub fn collect(store: &TieredCacheStore) -> Self {
        let prefix = store.prefix();
        let persistent = store.persistent();

        let mut persistent_count = 0;
        let mut approx_bytes: u64 = 0;
        match persistent.list_keys(prefix) {
            Ok(keys) => {
                for key in keys {
                    match persistent.read(&key) {
                        Ok(Some(text)) => {
                            persistent_count += 1;
                            approx_bytes += (key.len() + text.len()) as u64;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            persistent_count += 1;
                            warn!("Stats: failed to read {}: {}", key, e);
                        }
                    }
                }
            }
            Err(e) => warn!("Stats: failed to list persistent keys: {}", e),
        }

        let now = store.now_ms();
        let policies = store.policies();
        let items = store
            .fast_entries()
            .filter(|(name, entry)| entry.is_valid(policies.get(key::category_of(name)), now))
            .map(|(key, entry)| (key.to_string(), format_timestamp(entry.expires_at())))
            .collect();

        let counters = store.counters();
        Self {
            fast_count: store.fast_len(),
            persistent_count,
            approx_byte_size: format_bytes(approx_bytes),
            approx_bytes,
            hits: counters.hits,
            misses: counters.misses,
            hit_rate: counters.hit_rate(),
            promotions: counters.promotions,
            evictions: counters.evictions,
            persist_failures: counters.persist_failures,
            items,
        }
    }
}

// == Formatting ==
/// Formats a byte count as B, KB or MB with two decimals.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let value = bytes as f64;
    if value < KB {
        format!("{} B", bytes)
    } else if value < MB {
        format!("{:.2} KB", value / KB)
    } else {
        format!("{:.2} MB", value / MB)
    }
}

fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.persist_failures, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_record_evictions() {
        let mut stats = CacheStats::new();
        stats.record_evictions(2);
        stats.record_evictions(3);
        assert_eq!(stats.evictions, 5);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00+00:00");
    }
}
