//! Cache Store Module
//!
//! Two-tier response cache: a process-local map in front of a durable
//! namespace, with per-category TTL and schema version checks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::key::{self, Params, KEY_SEPARATOR};
use crate::cache::{CacheEntry, CacheStats, CategoryPolicyTable, StatsReport};
use crate::error::{CacheError, Result};
use crate::persist::{DurableNamespace, MemoryNamespace};

/// Prefix for this cache's keys in the persistent tier.
pub const DEFAULT_NAMESPACE: &str = "statcache:";

// == Tiered Cache Store ==
/// Owns the fast tier and the persistent tier and keeps them consistent.
///
/// Lookups try the fast tier, then the persistent tier, promoting valid
/// persistent hits. Anything that fails validation is removed on sight and
/// reported as absent.
#[derive(Debug)]
pub struct TieredCacheStore {
    /// Fast tier, keyed by encoded cache key
    fast: HashMap<String, CacheEntry>,
    /// Persistent tier, keyed by `prefix + encoded cache key`
    persistent: Box<dyn DurableNamespace>,
    prefix: String,
    policies: CategoryPolicyTable,
    clock: Arc<dyn Clock>,
    stats: CacheStats,
}

impl TieredCacheStore {
    // == Constructor ==
    /// Creates a store over the given persistent tier using the wall clock.
    pub fn new(policies: CategoryPolicyTable, persistent: Box<dyn DurableNamespace>) -> Self {
        Self {
            fast: HashMap::new(),
            persistent,
            prefix: DEFAULT_NAMESPACE.to_string(),
            policies,
            clock: Arc::new(SystemClock),
            stats: CacheStats::new(),
        }
    }

    /// Creates a store whose persistent tier lives in memory.
    pub fn in_memory(policies: CategoryPolicyTable) -> Self {
        Self::new(policies, Box::new(MemoryNamespace::new()))
    }

    /// Replaces the persistent key prefix.
    ///
    /// A prefix without a trailing [`KEY_SEPARATOR`] gets one appended, so
    /// `"dash"` owns `dash:*` but never `dashboard:*`.
    ///
    /// # Errors
    /// `InvalidNamespace` if the prefix is empty or only separators, since
    /// it would claim every key in the persistent tier.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Result<Self> {
        let mut prefix = prefix.into();
        if prefix.trim_end_matches(KEY_SEPARATOR).is_empty() {
            return Err(CacheError::InvalidNamespace(prefix));
        }
        if !prefix.ends_with(KEY_SEPARATOR) {
            prefix.push(KEY_SEPARATOR);
        }
        self.prefix = prefix;
        Ok(self)
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // == Get ==
    /// Looks up the payload cached for `category` and `params`.
    ///
    /// Returns `Ok(None)` on a miss, including when the stored entry is
    /// expired, has an outdated schema version, cannot be decoded, or does
    /// not deserialize into `T`. Never fetches.
    ///
    /// # Errors
    /// Only key encoding errors are returned.
    pub fn get<T: DeserializeOwned>(&mut self, category: &str, params: &Params) -> Result<Option<T>> {
        let key = key::encode(category, params)?;
        let now = self.clock.now_ms();

        let Some(payload) = self.lookup(&key, category, now) else {
            debug!("Cache miss: {}", key);
            self.stats.record_miss();
            return Ok(None);
        };

        match serde_json::from_value::<T>(payload) {
            Ok(value) => {
                self.stats.record_hit();
                Ok(Some(value))
            }
            Err(e) => {
                warn!("Cached payload for {} has unexpected shape, evicting: {}", key, e);
                self.remove_both(&key);
                self.stats.record_evictions(1);
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    /// Finds a valid payload, promoting or evicting along the way.
    ///
    /// An entry dropped from both tiers counts as one eviction.
    fn lookup(&mut self, key: &str, category: &str, now: u64) -> Option<Value> {
        let policy = self.policies.get(category);
        let mut evicted = false;

        if let Some(entry) = self.fast.get(key) {
            if entry.is_valid(policy, now) {
                debug!("Cache hit (fast): {}", key);
                return Some(entry.payload.clone());
            }
            debug!("Fast tier entry invalid: {}", key);
            self.fast.remove(key);
            evicted = true;
        }

        let storage_key = self.storage_key(key);
        let payload = match self.persistent.read(&storage_key) {
            Ok(Some(text)) => match CacheEntry::from_record(&text) {
                Ok(entry) if entry.is_valid(policy, now) => {
                    debug!("Cache hit (persistent), promoting: {}", key);
                    let payload = entry.payload.clone();
                    self.fast.insert(key.to_string(), entry);
                    self.stats.record_promotion();
                    Some(payload)
                }
                Ok(_) => {
                    debug!("Persistent entry invalid: {}", key);
                    self.remove_persistent(&storage_key);
                    evicted = true;
                    None
                }
                Err(e) => {
                    warn!("Corrupted persistent record for {}, removing: {}", key, e);
                    self.remove_persistent(&storage_key);
                    evicted = true;
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Persistent read failed for {}: {}", key, e);
                None
            }
        };

        if evicted {
            self.stats.record_evictions(1);
        }
        payload
    }

    // == Set ==
    /// Caches `payload` for `category` and `params` in both tiers.
    ///
    /// A failed persistent write is logged and counted; the fast tier still
    /// serves the entry for the rest of the process.
    ///
    /// # Errors
    /// - `PolicyMissing` if the category has no policy (nothing is written)
    /// - key encoding errors
    /// - `Serialization` if the payload cannot be represented as JSON
    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        category: &str,
        payload: &T,
        params: &Params,
    ) -> Result<()> {
        let policy = self
            .policies
            .get(category)
            .ok_or_else(|| CacheError::PolicyMissing(category.to_string()))?;
        let key = key::encode(category, params)?;

        let entry = CacheEntry::new(serde_json::to_value(payload)?, policy, self.clock.now_ms());
        let record = entry.to_record()?;
        let ttl_millis = entry.ttl_millis;

        self.fast.insert(key.clone(), entry);

        let storage_key = self.storage_key(&key);
        if let Err(e) = self.persistent.write(&storage_key, &record) {
            warn!(
                "Persistent write failed for {}, serving from fast tier only: {}",
                key, e
            );
            self.stats.record_persist_failure();
            // An older record left behind would resurface after a restart
            self.remove_persistent(&storage_key);
        }

        debug!("Cache set: {} (TTL: {}ms)", key, ttl_millis);
        Ok(())
    }

    // == Clear ==
    /// Removes one entry from both tiers. Clearing a missing entry is a no-op.
    pub fn clear(&mut self, category: &str, params: &Params) -> Result<()> {
        let key = key::encode(category, params)?;
        self.remove_both(&key);
        debug!("Cache clear: {}", key);
        Ok(())
    }

    // == Clear All ==
    /// Empties the fast tier and removes every persistent key under this
    /// store's prefix. Other keys in the namespace are left alone.
    ///
    /// Returns the number of distinct entries removed.
    pub fn clear_all(&mut self) -> usize {
        let mut removed: HashSet<String> = self.fast.drain().map(|(key, _)| key).collect();

        for storage_key in self.persistent_keys() {
            self.remove_persistent(&storage_key);
            if let Some(key) = storage_key.strip_prefix(self.prefix.as_str()) {
                removed.insert(key.to_string());
            }
        }

        info!("Cache cleared: {} entries removed", removed.len());
        removed.len()
    }

    // == Cleanup Expired ==
    /// Sweeps both tiers and removes every entry that is no longer valid.
    ///
    /// Valid entries are left untouched. Undecodable persistent records are
    /// removed. Returns the number of distinct entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut removed: HashSet<String> = HashSet::new();

        let policies = &self.policies;
        self.fast.retain(|key, entry| {
            let keep = entry.is_valid(policies.get(key::category_of(key)), now);
            if !keep {
                removed.insert(key.clone());
            }
            keep
        });

        for storage_key in self.persistent_keys() {
            let Some(key) = storage_key.strip_prefix(self.prefix.as_str()) else {
                continue;
            };
            let text = match self.persistent.read(&storage_key) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Sweep: failed to read {}: {}", storage_key, e);
                    continue;
                }
            };

            let valid = match CacheEntry::from_record(&text) {
                Ok(entry) => entry.is_valid(self.policies.get(key::category_of(key)), now),
                Err(e) => {
                    debug!("Sweep: corrupted record {}: {}", storage_key, e);
                    false
                }
            };

            if !valid {
                removed.insert(key.to_string());
                self.remove_persistent(&storage_key);
            }
        }

        self.stats.record_evictions(removed.len());
        if !removed.is_empty() {
            info!("Cache cleanup: {} expired entries removed", removed.len());
        } else {
            debug!("Cache cleanup: no expired entries found");
        }
        removed.len()
    }

    // == Stats ==
    /// Returns a snapshot of both tiers and the running counters.
    pub fn stats(&self) -> StatsReport {
        StatsReport::collect(self)
    }

    // == Accessors ==
    /// Current time according to the store's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn policies(&self) -> &CategoryPolicyTable {
        &self.policies
    }

    pub fn counters(&self) -> &CacheStats {
        &self.stats
    }

    pub fn fast_len(&self) -> usize {
        self.fast.len()
    }

    pub fn fast_entries(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.fast.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn persistent(&self) -> &dyn DurableNamespace {
        self.persistent.as_ref()
    }

    /// Direct access to the persistent tier, bypassing validation.
    pub fn persistent_mut(&mut self) -> &mut dyn DurableNamespace {
        self.persistent.as_mut()
    }

    /// Drops the fast tier and hands back the persistent tier, as a
    /// process exit would.
    pub fn into_persistent(self) -> Box<dyn DurableNamespace> {
        self.persistent
    }

    // == Helpers ==
    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn persistent_keys(&self) -> Vec<String> {
        match self.persistent.list_keys(&self.prefix) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list persistent keys: {}", e);
                Vec::new()
            }
        }
    }

    fn remove_both(&mut self, key: &str) {
        self.fast.remove(key);
        let storage_key = self.storage_key(key);
        self.remove_persistent(&storage_key);
    }

    fn remove_persistent(&mut self, storage_key: &str) {
        if let Err(e) = self.persistent.remove(storage_key) {
            warn!("Persistent remove failed for {}: {}", storage_key, e);
            self.stats.record_persist_failure();
        }
    }
}
