//! Search counters and their Prometheus export.
//!
//! Counters are injected into the search service instead of living in
//! process-wide statics, so each test can build (and reset) its own.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const NAMESPACE: &str = "forum_search";

/// Snapshot of cache effectiveness
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Percentage of lookups served from cache, 0 when nothing was looked up
    pub hit_rate: f64,
}

pub trait SearchMetrics: Send + Sync {
    fn record_cache_hit(&self);

    fn record_cache_miss(&self);

    fn record_search(&self, content_type: &str, duration: Duration);

    fn cache_stats(&self) -> CacheStats;

    fn total_searches(&self) -> u64;

    fn reset(&self);
}

/// Lock-free in-process counters
#[derive(Debug, Default)]
pub struct AtomicSearchMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    searches: AtomicU64,
}

impl AtomicSearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchMetrics for AtomicSearchMetrics {
    fn record_cache_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_cache_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_search(&self, _content_type: &str, _duration: Duration) {
        self.searches.fetch_add(1, Ordering::Relaxed);
    }

    fn cache_stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            (hits as f64 / lookups as f64 * 10_000.0).round() / 100.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
        }
    }

    fn total_searches(&self) -> u64 {
        self.searches.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.searches.store(0, Ordering::Relaxed);
    }
}

/// Counters mirrored into a Prometheus registry
pub struct PrometheusSearchMetrics {
    local: AtomicSearchMetrics,
    requests_total: IntCounterVec,
    cache_hits_total: IntCounter,
    cache_misses_total: IntCounter,
    duration_seconds: Histogram,
}

impl PrometheusSearchMetrics {
    /// Create the metrics and register them on `registry`
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests_total = IntCounterVec::new(
            Opts::new("search_requests_total", "Total number of completed searches")
                .namespace(NAMESPACE),
            &["content_type"],
        )?;
        let cache_hits_total = IntCounter::with_opts(
            Opts::new("search_cache_hits_total", "Searches served from the result cache")
                .namespace(NAMESPACE),
        )?;
        let cache_misses_total = IntCounter::with_opts(
            Opts::new("search_cache_misses_total", "Searches that missed the result cache")
                .namespace(NAMESPACE),
        )?;
        let duration_seconds = Histogram::with_opts(
            HistogramOpts::new("search_duration_seconds", "Search duration in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(cache_hits_total.clone()))?;
        registry.register(Box::new(cache_misses_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;

        Ok(Self {
            local: AtomicSearchMetrics::new(),
            requests_total,
            cache_hits_total,
            cache_misses_total,
            duration_seconds,
        })
    }
}

impl SearchMetrics for PrometheusSearchMetrics {
    fn record_cache_hit(&self) {
        self.local.record_cache_hit();
        self.cache_hits_total.inc();
    }

    fn record_cache_miss(&self) {
        self.local.record_cache_miss();
        self.cache_misses_total.inc();
    }

    fn record_search(&self, content_type: &str, duration: Duration) {
        self.local.record_search(content_type, duration);
        self.requests_total.with_label_values(&[content_type]).inc();
        self.duration_seconds.observe(duration.as_secs_f64());
    }

    fn cache_stats(&self) -> CacheStats {
        self.local.cache_stats()
    }

    fn total_searches(&self) -> u64 {
        self.local.total_searches()
    }

    fn reset(&self) {
        self.local.reset();
        self.requests_total.reset();
        self.cache_hits_total.reset();
        self.cache_misses_total.reset();
    }
}

/// Gather all metrics in `registry` in Prometheus text format
pub fn gather_metrics(registry: &Registry) -> String {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
