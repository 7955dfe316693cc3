use std::time::Duration;

use resolver_core::{SelectionPolicy, DEFAULT_MAX_CONCURRENT};
use serde::Deserialize;
use serde_json::Value;
use sparse_index::{IndexError, IndexOptions, CRATES_IO_INDEX, DEFAULT_CACHE_CAPACITY};
use tracing::debug;

/// Settings for one resolution request.
///
/// Deserialized from camelCase JSON; every field has a default.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    #[serde(default)]
    pub policy: SelectionPolicy,
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::default(),
            max_concurrent_lookups: default_max_concurrent_lookups(),
            registry: RegistryConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    #[serde(default = "default_index_url")]
    pub index_url: String,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl RegistryConfig {
    pub fn index_options(&self) -> Result<IndexOptions, IndexError> {
        let mut options = IndexOptions::new(&self.index_url)?;
        options.cache_ttl = Duration::from_secs(self.cache_ttl_secs);
        options.cache_capacity = self.cache_capacity;
        Ok(options)
    }
}

fn default_max_concurrent_lookups() -> usize {
    DEFAULT_MAX_CONCURRENT
}

fn default_index_url() -> String {
    CRATES_IO_INDEX.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    180
}

fn default_cache_capacity() -> u64 {
    DEFAULT_CACHE_CAPACITY
}

impl ResolverConfig {
    /// Build from caller-supplied options, falling back to defaults when they
    /// are absent or malformed.
    pub fn from_value(value: Option<Value>) -> Self {
        let config: ResolverConfig = value
            .map(serde_json::from_value)
            .and_then(|v| v.ok())
            .unwrap_or_default();
        debug!("config {:?}", config);
        config
    }
}
