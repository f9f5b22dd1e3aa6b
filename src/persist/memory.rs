//! In-memory durable namespace.

use std::collections::BTreeMap;

use tracing::debug;

use super::DurableNamespace;
use crate::error::{CacheError, Result};

/// Map-backed namespace. With a quota set, writes that would push the total
/// key and value bytes past it fail the way a full browser storage area does.
#[derive(Debug, Default)]
pub struct MemoryNamespace {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the total stored bytes (keys plus values).
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Total bytes of keys and values currently stored.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DurableNamespace for MemoryNamespace {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, text: &str) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = self.used_bytes() - replaced + key.len() + text.len();
            if needed > quota {
                debug!("Quota of {} bytes exceeded writing {}", quota, key);
                return Err(CacheError::Persistence(format!(
                    "storage quota of {} bytes exceeded",
                    quota
                )));
            }
        }
        self.entries.insert(key.to_string(), text.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_remove() {
        let mut ns = MemoryNamespace::new();
        ns.write("a", "1").unwrap();

        assert_eq!(ns.read("a").unwrap().as_deref(), Some("1"));
        ns.remove("a").unwrap();
        assert_eq!(ns.read("a").unwrap(), None);

        // Removing again is fine
        ns.remove("a").unwrap();
    }

    #[test]
    fn test_list_keys_by_prefix() {
        let mut ns = MemoryNamespace::new();
        ns.write("cache:a", "1").unwrap();
        ns.write("cache:b", "2").unwrap();
        ns.write("settings", "{}").unwrap();
        ns.write("cachet", "x").unwrap();

        let keys = ns.list_keys("cache:").unwrap();
        assert_eq!(keys, vec!["cache:a".to_string(), "cache:b".to_string()]);
    }

    #[test]
    fn test_quota_exceeded() {
        let mut ns = MemoryNamespace::with_quota(10);
        ns.write("k", "12345").unwrap();

        let result = ns.write("k2", "123456789");
        assert!(matches!(result, Err(CacheError::Persistence(_))));
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn test_quota_counts_replacement() {
        let mut ns = MemoryNamespace::with_quota(10);
        ns.write("k", "123456789").unwrap();
        // Overwriting the same key frees its old bytes first
        ns.write("k", "987654321").unwrap();
        assert_eq!(ns.used_bytes(), 10);
    }
}
