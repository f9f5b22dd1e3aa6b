//! Cache Entry Module
//!
//! Defines the unit of storage shared by both tiers and its persisted form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::policy::CategoryPolicy;
use crate::error::Result;

// == Cache Entry ==
/// A cached response body with the metadata needed to judge its validity.
///
/// Serialized as `{payload, storedAt, schemaVersion, ttlMillis}` in the
/// persistent tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The cached response body
    pub payload: Value,
    /// Write timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Policy version at write time
    pub schema_version: String,
    /// Validity window copied from the policy at write time
    pub ttl_millis: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Stamps a payload with the policy's version and TTL.
    pub fn new(payload: Value, policy: &CategoryPolicy, now_ms: u64) -> Self {
        Self {
            payload,
            stored_at: now_ms,
            schema_version: policy.schema_version.clone(),
            ttl_millis: policy.ttl_millis,
        }
    }

    // == Is Expired ==
    /// True once `ttl_millis` has fully elapsed since `stored_at`.
    ///
    /// An entry stored in the future (clock skew) counts as fresh.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.stored_at) >= self.ttl_millis
    }

    // == Is Valid ==
    /// Valid iff the current policy exists, its version matches, and the TTL
    /// has not elapsed.
    pub fn is_valid(&self, policy: Option<&CategoryPolicy>, now_ms: u64) -> bool {
        match policy {
            Some(policy) => {
                self.schema_version == policy.schema_version && !self.is_expired(now_ms)
            }
            None => false,
        }
    }

    /// Absolute expiry time in Unix milliseconds.
    pub fn expires_at(&self) -> u64 {
        self.stored_at.saturating_add(self.ttl_millis)
    }

    /// Returns remaining TTL in milliseconds (0 once expired).
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at().saturating_sub(now_ms)
    }

    // == Persisted Form ==
    pub fn to_record(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_record(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
