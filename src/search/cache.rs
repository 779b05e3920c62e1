//! Fingerprint-keyed cache of ranked results with adaptive TTL

use crate::clock::Clock;
use crate::metrics::SearchMetrics;
use crate::models::{CacheEntry, ResultRecord, SearchMetadata};
use crate::search::config::CacheConfig;
use crate::search::query::ContentType;
use crate::state::CacheBackend;
use std::sync::Arc;

pub struct SearchCache {
    backend: Arc<dyn CacheBackend>,
    metrics: Arc<dyn SearchMetrics>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
}

impl SearchCache {
    pub fn new(
        backend: Arc<dyn CacheBackend>,
        metrics: Arc<dyn SearchMetrics>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        Self {
            backend,
            metrics,
            clock,
            config,
        }
    }

    /// Whether results for this search may be cached at all.
    /// User results are never cached.
    pub fn should_cache(&self, normalized_query: &str, content_type: ContentType) -> bool {
        self.config.enabled
            && normalized_query.chars().count() >= self.config.min_query_len
            && content_type != ContentType::Users
    }

    /// Shorter TTL for searches with few results
    pub fn ttl_for(&self, total_results: usize) -> u64 {
        if total_results < self.config.low_result_threshold {
            self.config.low_result_ttl_secs
        } else {
            self.config.default_ttl_secs
        }
    }

    /// Look up a live entry. Expired entries and backend errors count as misses.
    pub async fn get(&self, fingerprint: &str) -> Option<CacheEntry> {
        let entry = match self.backend.get(fingerprint).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Cache lookup failed, treating as miss");
                None
            }
        };

        match entry {
            Some(entry) if !entry.is_expired(self.clock.now()) => {
                self.metrics.record_cache_hit();
                tracing::debug!(fingerprint, "Search cache hit");
                Some(entry)
            }
            Some(_) => {
                if let Err(e) = self.backend.invalidate(fingerprint).await {
                    tracing::warn!(error = %e, "Failed to evict expired cache entry");
                }
                self.metrics.record_cache_miss();
                tracing::debug!(fingerprint, "Search cache entry expired");
                None
            }
            None => {
                self.metrics.record_cache_miss();
                tracing::debug!(fingerprint, "Search cache miss");
                None
            }
        }
    }

    /// Store ranked results; failures are logged and otherwise ignored
    pub async fn set(&self, fingerprint: &str, results: Vec<ResultRecord>, metadata: SearchMetadata) {
        let entry = CacheEntry {
            fingerprint: fingerprint.to_string(),
            ttl_secs: self.ttl_for(metadata.total_results),
            cached_at: self.clock.now(),
            results,
            metadata,
        };

        if let Err(e) = self.backend.insert(fingerprint.to_string(), entry).await {
            tracing::warn!(error = %e, "Failed to store search results in cache");
        }
    }

    pub async fn entry_count(&self) -> u64 {
        self.backend.entry_count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{AppError, Result};
    use crate::metrics::AtomicSearchMetrics;
    use crate::state::MokaCacheBackend;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    fn cache(clock: Arc<ManualClock>, metrics: Arc<AtomicSearchMetrics>) -> SearchCache {
        SearchCache::new(
            Arc::new(MokaCacheBackend::new(100)),
            metrics,
            clock,
            CacheConfig::default(),
        )
    }

    fn metadata(total_results: usize) -> SearchMetadata {
        SearchMetadata {
            search_time_ms: 12,
            database_hits: 5,
            total_results,
        }
    }

    #[test]
    fn test_should_cache() {
        let cache = cache(Arc::new(ManualClock::new(Utc::now())), Arc::new(AtomicSearchMetrics::new()));
        assert!(!cache.should_cache("ab", ContentType::All));
        assert!(cache.should_cache("abc", ContentType::All));
        assert!(!cache.should_cache("python", ContentType::Users));
        assert!(cache.should_cache("python", ContentType::Categories));
    }

    #[tokio::test]
    async fn test_round_trip_before_ttl() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let metrics = Arc::new(AtomicSearchMetrics::new());
        let cache = cache(clock.clone(), metrics.clone());

        assert!(cache.get("fp").await.is_none());
        cache.set("fp", vec![], metadata(10)).await;

        clock.advance(Duration::seconds(299));
        let entry = cache.get("fp").await.unwrap();
        assert_eq!(entry.metadata, metadata(10));
        assert_eq!(entry.ttl_secs, 300);

        let stats = metrics.cache_stats();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[tokio::test]
    async fn test_low_result_ttl() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = cache(clock.clone(), Arc::new(AtomicSearchMetrics::new()));

        cache.set("few", vec![], metadata(4)).await;
        cache.set("many", vec![], metadata(5)).await;

        clock.advance(Duration::seconds(150));
        assert!(cache.get("few").await.is_none());
        assert!(cache.get("many").await.is_some());

        clock.advance(Duration::seconds(150));
        assert!(cache.get("many").await.is_none());
    }

    struct BrokenBackend;

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        async fn get(&self, _key: &str) -> Result<Option<CacheEntry>> {
            Err(AppError::Internal("cache down".into()))
        }

        async fn insert(&self, _key: String, _entry: CacheEntry) -> Result<()> {
            Err(AppError::Internal("cache down".into()))
        }

        async fn invalidate(&self, _key: &str) -> Result<()> {
            Err(AppError::Internal("cache down".into()))
        }

        async fn entry_count(&self) -> u64 {
            0
        }
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_miss() {
        let metrics = Arc::new(AtomicSearchMetrics::new());
        let cache = SearchCache::new(
            Arc::new(BrokenBackend),
            metrics.clone(),
            Arc::new(ManualClock::new(Utc::now())),
            CacheConfig::default(),
        );

        cache.set("fp", vec![], metadata(10)).await;
        assert!(cache.get("fp").await.is_none());
        assert_eq!(metrics.cache_stats().misses, 1);
    }
}
