//! Shared fixtures for integration tests
//!
//! Every test runs against `data/forum.json` with a manual clock pinned to
//! 2026-10-19 12:00 UTC and analytics written inline, so searches, records
//! and summaries are deterministic.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use forum_search::{
    analytics::{AnalyticsConfig, AnalyticsRecorder, InMemoryAnalyticsStore},
    api::AppState,
    clock::{Clock, ManualClock},
    history::{SavedSearches, SearchHistory},
    metrics::{AtomicSearchMetrics, SearchMetrics},
    search::{build_strategy, BackendKind, SearchConfigBuilder, SearchService, SuggestionProvider},
    state::{load_fixture, ForumStore, InMemoryForumStore},
};
use prometheus::Registry;
use std::path::PathBuf;
use std::sync::Arc;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

pub fn forum_store() -> Arc<dyn ForumStore> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/forum.json");
    let fixture = load_fixture(&path).expect("fixture should load");
    Arc::new(InMemoryForumStore::from_fixture(fixture))
}

pub struct TestHarness {
    pub store: Arc<dyn ForumStore>,
    pub clock: Arc<ManualClock>,
    pub metrics: Arc<dyn SearchMetrics>,
    pub analytics: Arc<AnalyticsRecorder>,
    pub service: Arc<SearchService>,
}

impl TestHarness {
    pub async fn new(backend: BackendKind) -> Self {
        Self::with_analytics(backend, AnalyticsConfig::builder().record_inline(true).build()).await
    }

    pub async fn with_analytics(backend: BackendKind, analytics_config: AnalyticsConfig) -> Self {
        let store = forum_store();
        let clock = Arc::new(ManualClock::new(now()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let config = SearchConfigBuilder::new()
            .backend(backend)
            .writer_heap_size(15_000_000)
            .build();
        let strategy = build_strategy(store.clone(), &config)
            .await
            .expect("strategy should build");

        let metrics: Arc<dyn SearchMetrics> = Arc::new(AtomicSearchMetrics::new());
        let analytics = Arc::new(AnalyticsRecorder::new(
            Arc::new(InMemoryAnalyticsStore::new()),
            dyn_clock.clone(),
            analytics_config,
        ));

        let service = Arc::new(
            SearchService::builder(store.clone(), strategy)
                .clock(dyn_clock.clone())
                .metrics(metrics.clone())
                .search_config(config)
                .analytics(analytics.clone())
                .history(Arc::new(SearchHistory::new(dyn_clock)))
                .build(),
        );

        Self {
            store,
            clock,
            metrics,
            analytics,
            service,
        }
    }

    pub async fn portable() -> Self {
        Self::new(BackendKind::Portable).await
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(
            self.service.clone(),
            Arc::new(SuggestionProvider::new(self.store.clone())),
            Arc::new(SavedSearches::new(self.clock.clone())),
            Arc::new(Registry::new()),
        )
    }
}
