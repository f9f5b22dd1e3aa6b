//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::{DEFAULT_CATEGORY_TTLS, DEFAULT_NAMESPACE, DEFAULT_SCHEMA_VERSION};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// JSON file backing the persistent tier; in-memory when unset
    pub cache_file: Option<PathBuf>,
    /// Prefix for this cache's keys in the persistent tier
    pub namespace: String,
    /// Schema version stamped on every category
    pub schema_version: String,
    /// Category name and TTL in minutes
    pub category_ttls: Vec<(String, u64)>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_FILE` - Persistent tier file (default: in-memory)
    /// - `CACHE_NAMESPACE` - Persistent key prefix (default: `statcache:`)
    /// - `CACHE_SCHEMA_VERSION` - Schema version for all categories (default: 1.0)
    /// - `CACHE_TTL_<CATEGORY>` - TTL in minutes, e.g. `CACHE_TTL_PLAYER_PROFILE`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            cache_file: env::var("CACHE_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            namespace: env::var("CACHE_NAMESPACE").unwrap_or(defaults.namespace),
            schema_version: env::var("CACHE_SCHEMA_VERSION").unwrap_or(defaults.schema_version),
            category_ttls: defaults
                .category_ttls
                .into_iter()
                .map(|(category, minutes)| {
                    let var = format!("CACHE_TTL_{}", category.to_uppercase());
                    let minutes = parse_var(&var).unwrap_or(minutes);
                    (category, minutes)
                })
                .collect(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 60,
            cache_file: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            schema_version: DEFAULT_SCHEMA_VERSION.to_string(),
            category_ttls: DEFAULT_CATEGORY_TTLS
                .iter()
                .map(|(category, minutes)| (category.to_string(), *minutes))
                .collect(),
        }
    }
}
