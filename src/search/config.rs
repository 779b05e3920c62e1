//! Search configuration

use serde::{Deserialize, Serialize};

/// Which matching backend the executor is built with
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Case-insensitive substring matching, works over any repository
    #[default]
    Portable,
    /// Tantivy inverted index with BM25 scoring
    Native,
}

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Matching backend, chosen once at startup
    pub backend: BackendKind,

    /// Deadline for executing all per-type searches of one request
    pub deadline_ms: u64,

    /// Maximum results a single per-type search keeps, counted after filtering
    pub max_results_per_type: usize,

    /// Index writer heap size in bytes (default: 50MB)
    pub writer_heap_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Portable,
            deadline_ms: 5_000,
            max_results_per_type: 500,
            writer_heap_size: 50_000_000, // 50MB
        }
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.config.deadline_ms = deadline_ms;
        self
    }

    pub fn max_results_per_type(mut self, max: usize) -> Self {
        self.config.max_results_per_type = max;
        self
    }

    pub fn writer_heap_size(mut self, size: usize) -> Self {
        self.config.writer_heap_size = size;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    /// Maximum number of cached searches
    pub max_capacity: u64,

    pub default_ttl_secs: u64,

    /// TTL for searches with fewer than `low_result_threshold` results
    pub low_result_ttl_secs: u64,

    pub low_result_threshold: usize,

    /// Normalized queries shorter than this are never cached
    pub min_query_len: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: 10_000,
            default_ttl_secs: 300,
            low_result_ttl_secs: 150,
            low_result_threshold: 5,
            min_query_len: 3,
        }
    }
}
