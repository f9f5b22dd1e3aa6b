//! Category Policy Module
//!
//! Static mapping from data category to its schema version and TTL.

use std::collections::HashMap;

use crate::cache::key::KEY_SEPARATOR;
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Schema version stamped on entries when none is configured.
pub const DEFAULT_SCHEMA_VERSION: &str = "1.0";

/// Categories served by the dashboard proxy and their TTLs in minutes.
pub const DEFAULT_CATEGORY_TTLS: &[(&str, u64)] = &[
    ("hero_constants", 1440),
    ("player_profile", 30),
    ("player_winloss", 60),
    ("player_heroes", 120),
    ("player_matches", 10),
    ("search_results", 5),
];

// == Category Policy ==
/// Schema version and time-to-live for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPolicy {
    /// Tag describing the payload shape; bumping it invalidates older entries
    pub schema_version: String,
    /// Validity window for new entries, in milliseconds
    pub ttl_millis: u64,
}

impl CategoryPolicy {
    pub fn new(schema_version: impl Into<String>, ttl_millis: u64) -> Self {
        Self {
            schema_version: schema_version.into(),
            ttl_millis,
        }
    }
}

// == Category Policy Table ==
/// Read-only lookup of category policies, fixed once built.
#[derive(Debug, Clone, Default)]
pub struct CategoryPolicyTable {
    policies: HashMap<String, CategoryPolicy>,
}

impl CategoryPolicyTable {
    /// Starts a new table.
    pub fn builder() -> PolicyTableBuilder {
        PolicyTableBuilder::default()
    }

    /// The proxy's categories at schema version `1.0`.
    pub fn default_table() -> Self {
        let mut builder = Self::builder();
        for (category, minutes) in DEFAULT_CATEGORY_TTLS {
            builder = builder.category(*category, DEFAULT_SCHEMA_VERSION, minutes * 60_000);
        }
        // Default names are known-good.
        Self {
            policies: builder.policies,
        }
    }

    /// Builds the table from configured TTL overrides and schema version.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Self::builder();
        for (category, minutes) in &config.category_ttls {
            builder = builder.category(
                category.clone(),
                config.schema_version.clone(),
                minutes.saturating_mul(60_000),
            );
        }
        builder.build()
    }

    /// Returns the policy for a category, if registered.
    pub fn get(&self, category: &str) -> Option<&CategoryPolicy> {
        self.policies.get(category)
    }

    /// Returns all policies sorted by category name.
    pub fn sorted(&self) -> Vec<(&str, &CategoryPolicy)> {
        let mut all: Vec<(&str, &CategoryPolicy)> = self
            .policies
            .iter()
            .map(|(name, policy)| (name.as_str(), policy))
            .collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

// == Builder ==
/// Collects policies before the table is frozen.
#[derive(Debug, Default)]
pub struct PolicyTableBuilder {
    policies: HashMap<String, CategoryPolicy>,
}

impl PolicyTableBuilder {
    /// Registers a category. A later call for the same name replaces it.
    pub fn category(
        mut self,
        name: impl Into<String>,
        schema_version: impl Into<String>,
        ttl_millis: u64,
    ) -> Self {
        self.policies
            .insert(name.into(), CategoryPolicy::new(schema_version, ttl_millis));
        self
    }

    /// Freezes the table.
    ///
    /// Fails if a category name could not be used as a key prefix.
    pub fn build(self) -> Result<CategoryPolicyTable> {
        if let Some(bad) = self
            .policies
            .keys()
            .find(|name| name.is_empty() || name.contains(KEY_SEPARATOR))
        {
            return Err(CacheError::InvalidCategory(bad.clone()));
        }
        Ok(CategoryPolicyTable {
            policies: self.policies,
        })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = CategoryPolicyTable::default_table();
        assert_eq!(table.len(), DEFAULT_CATEGORY_TTLS.len());

        let profile = table.get("player_profile").unwrap();
        assert_eq!(profile.schema_version, "1.0");
        assert_eq!(profile.ttl_millis, 30 * 60_000);

        let heroes = table.get("hero_constants").unwrap();
        assert_eq!(heroes.ttl_millis, 24 * 60 * 60_000);
    }

    #[test]
    fn test_unknown_category() {
        let table = CategoryPolicyTable::default_table();
        assert!(table.get("player_totals").is_none());
    }

    #[test]
    fn test_builder_replaces_duplicate() {
        let table = CategoryPolicyTable::builder()
            .category("c", "1.0", 1_000)
            .category("c", "2.0", 2_000)
            .build()
            .unwrap();
        assert_eq!(table.get("c"), Some(&CategoryPolicy::new("2.0", 2_000)));
    }

    #[test]
    fn test_builder_rejects_separator() {
        let result = CategoryPolicyTable::builder()
            .category("bad:name", "1.0", 1_000)
            .build();
        assert!(matches!(result, Err(CacheError::InvalidCategory(_))));
    }

    #[test]
    fn test_sorted() {
        let table = CategoryPolicyTable::default_table();
        let names: Vec<&str> = table.sorted().into_iter().map(|(name, _)| name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.schema_version = "3.1".to_string();
        config.category_ttls = vec![("player_profile".to_string(), 2)];

        let table = CategoryPolicyTable::from_config(&config).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("player_profile"),
            Some(&CategoryPolicy::new("3.1", 120_000))
        );
    }
}
