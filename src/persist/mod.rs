//! Persistent Tier Module
//!
//! The durable key-value namespace behind the cache's slow tier. Any store
//! that can read, write, remove and list string keys can back it.
//!
//! # Implementations
//! - [`MemoryNamespace`]: process-local map with an optional byte quota
//! - [`FileNamespace`]: JSON file rewritten atomically on every change

mod file;
mod memory;

use std::fmt::Debug;

use crate::error::Result;

pub use file::FileNamespace;
pub use memory::MemoryNamespace;

/// Durable string key-value storage, possibly shared with unrelated data.
pub trait DurableNamespace: Send + Sync + Debug {
    /// Returns the text stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Stores `text` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, text: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Lists every key starting with `prefix`.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}
