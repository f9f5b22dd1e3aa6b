//! Cache Module
//!
//! Tiered response cache with per-category TTL and schema versioning.

pub mod clock;
mod entry;
pub mod key;
mod policy;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::Params;
pub use policy::{
    CategoryPolicy, CategoryPolicyTable, PolicyTableBuilder, DEFAULT_CATEGORY_TTLS,
    DEFAULT_SCHEMA_VERSION,
};
pub use stats::{format_bytes, CacheStats, StatsReport};
pub use store::{TieredCacheStore, DEFAULT_NAMESPACE};
