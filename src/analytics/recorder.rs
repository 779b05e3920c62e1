//! Search event recording with a fail-silent boundary

use crate::analytics::config::AnalyticsConfig;
use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::models::{AnalyticsRecord, ClickFeedback, SearchEvent};
use crate::analytics::store::AnalyticsStore;
use crate::analytics::summary::{summarize, AnalyticsSummary, MAX_PERIOD_DAYS};
use crate::clock::Clock;
use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct AnalyticsRecorder {
    store: Arc<dyn AnalyticsStore>,
    clock: Arc<dyn Clock>,
    config: AnalyticsConfig,
}

impl AnalyticsRecorder {
    pub fn new(store: Arc<dyn AnalyticsStore>, clock: Arc<dyn Clock>, config: AnalyticsConfig) -> Self {
        Self { store, clock, config }
    }

    /// Record a completed search under `id`. Never fails: errors are logged.
    /// Unless configured inline, the write runs on a spawned task.
    pub async fn record(&self, id: Uuid, event: SearchEvent) {
        if !self.config.enabled {
            return;
        }

        let record = AnalyticsRecord::from_event(id, event, self.clock.now());
        let store = self.store.clone();
        let timeout = Duration::from_millis(self.config.record_timeout_ms);

        if self.config.record_inline {
            write_record(store, record, timeout).await;
        } else {
            tokio::spawn(write_record(store, record, timeout));
        }
    }

    /// Attach click feedback to a recorded search, replacing any earlier click
    pub async fn record_click(&self, id: Uuid, click: ClickFeedback) -> AnalyticsResult<()> {
        self.store.set_click(id, click).await?;
        tracing::info!(
            search_id = %id,
            position = click.position,
            result_type = %click.result_type,
            "Recorded search click"
        );
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> AnalyticsResult<Option<AnalyticsRecord>> {
        self.store.get(id).await
    }

    /// Summary of the last `days` days, `days` in `1..=365`
    pub async fn summary(&self, days: i64) -> AnalyticsResult<AnalyticsSummary> {
        if !(1..=MAX_PERIOD_DAYS).contains(&days) {
            return Err(AnalyticsError::InvalidPeriod(days));
        }
        let since = self.clock.now() - ChronoDuration::days(days);
        let records = self.store.since(since).await?;
        Ok(summarize(&records, days))
    }
}

async fn write_record(store: Arc<dyn AnalyticsStore>, record: AnalyticsRecord, timeout: Duration) {
    let id = record.id;
    let result = match tokio::time::timeout(timeout, store.insert(record)).await {
        Ok(result) => result,
        Err(_) => Err(AnalyticsError::Timeout(timeout.as_millis() as u64)),
    };

    match result {
        Ok(()) => tracing::debug!(search_id = %id, "Recorded search analytics"),
        Err(e) => tracing::warn!(search_id = %id, error = %e, "Failed to record search analytics"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::models::RequestContext;
    use crate::analytics::store::InMemoryAnalyticsStore;
    use crate::clock::ManualClock;
    use crate::models::ResultType;
    use crate::search::{ContentType, SortBy};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::BTreeMap;

    fn event(query: &str) -> SearchEvent {
        SearchEvent {
            query: query.into(),
            normalized_query: query.into(),
            content_type: ContentType::All,
            sort_by: SortBy::Relevance,
            results_count: 2,
            search_time_ms: 7,
            database_hits: 5,
            filters_used: BTreeMap::new(),
            cache_hit: false,
            context: RequestContext {
                session_id: "session".into(),
                ..Default::default()
            },
        }
    }

    fn inline() -> AnalyticsConfig {
        AnalyticsConfig::builder().record_inline(true).build()
    }

    #[tokio::test]
    async fn test_inline_record_and_click() {
        let store = InMemoryAnalyticsStore::new();
        let recorder = AnalyticsRecorder::new(
            Arc::new(store.clone()),
            Arc::new(ManualClock::new(Utc::now())),
            inline(),
        );

        let id = Uuid::new_v4();
        recorder.record(id, event("test")).await;
        assert_eq!(store.len(), 1);

        recorder
            .record_click(
                id,
                ClickFeedback {
                    position: 1,
                    result_type: ResultType::Post,
                    time_to_click_ms: Some(1200),
                },
            )
            .await
            .unwrap();
        let record = recorder.get(id).await.unwrap().unwrap();
        assert_eq!(record.clicked_result_position, Some(1));
        assert_eq!(record.time_to_click_ms, Some(1200));
    }

    #[tokio::test]
    async fn test_click_on_unknown_record() {
        let recorder = AnalyticsRecorder::new(
            Arc::new(InMemoryAnalyticsStore::new()),
            Arc::new(ManualClock::new(Utc::now())),
            inline(),
        );
        let result = recorder
            .record_click(
                Uuid::new_v4(),
                ClickFeedback {
                    position: 1,
                    result_type: ResultType::Post,
                    time_to_click_ms: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AnalyticsError::RecordNotFound(_))));
    }

    #[tokio::test]
    async fn test_disabled_records_nothing() {
        let store = InMemoryAnalyticsStore::new();
        let recorder = AnalyticsRecorder::new(
            Arc::new(store.clone()),
            Arc::new(ManualClock::new(Utc::now())),
            AnalyticsConfig::builder().enabled(false).record_inline(true).build(),
        );
        recorder.record(Uuid::new_v4(), event("test")).await;
        assert!(store.is_empty());
    }

    struct FailingStore;

    #[async_trait]
    impl AnalyticsStore for FailingStore {
        async fn insert(&self, _record: AnalyticsRecord) -> AnalyticsResult<()> {
            Err(AnalyticsError::StoreFailure("disk full".into()))
        }

        async fn get(&self, _id: Uuid) -> AnalyticsResult<Option<AnalyticsRecord>> {
            Ok(None)
        }

        async fn set_click(&self, id: Uuid, _click: ClickFeedback) -> AnalyticsResult<()> {
            Err(AnalyticsError::RecordNotFound(id))
        }

        async fn since(&self, _since: DateTime<Utc>) -> AnalyticsResult<Vec<AnalyticsRecord>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed() {
        let recorder = AnalyticsRecorder::new(
            Arc::new(FailingStore),
            Arc::new(ManualClock::new(Utc::now())),
            inline(),
        );
        recorder.record(Uuid::new_v4(), event("test")).await;
    }

    /// Delays every insert before handing it to an in-memory store
    struct SlowStore {
        inner: InMemoryAnalyticsStore,
        delay: Duration,
    }

    #[async_trait]
    impl AnalyticsStore for SlowStore {
        async fn insert(&self, record: AnalyticsRecord) -> AnalyticsResult<()> {
            tokio::time::sleep(self.delay).await;
            self.inner.insert(record).await
        }

        async fn get(&self, id: Uuid) -> AnalyticsResult<Option<AnalyticsRecord>> {
            self.inner.get(id).await
        }

        async fn set_click(&self, id: Uuid, click: ClickFeedback) -> AnalyticsResult<()> {
            self.inner.set_click(id, click).await
        }

        async fn since(&self, since: DateTime<Utc>) -> AnalyticsResult<Vec<AnalyticsRecord>> {
            self.inner.since(since).await
        }
    }

    #[tokio::test]
    async fn test_default_config_records_in_background() {
        let inner = InMemoryAnalyticsStore::new();
        let recorder = AnalyticsRecorder::new(
            Arc::new(SlowStore {
                inner: inner.clone(),
                delay: Duration::from_millis(200),
            }),
            Arc::new(ManualClock::new(Utc::now())),
            AnalyticsConfig::default(),
        );
        assert!(!AnalyticsConfig::default().record_inline);

        let id = Uuid::new_v4();
        tokio::time::timeout(Duration::from_millis(100), recorder.record(id, event("test")))
            .await
            .expect("record should not wait for the store");
        assert!(inner.is_empty());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(inner.len(), 1);
        assert!(recorder.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_background_write_times_out() {
        let inner = InMemoryAnalyticsStore::new();
        let recorder = AnalyticsRecorder::new(
            Arc::new(SlowStore {
                inner: inner.clone(),
                delay: Duration::from_millis(300),
            }),
            Arc::new(ManualClock::new(Utc::now())),
            AnalyticsConfig::builder().record_timeout_ms(50).build(),
        );

        recorder.record(Uuid::new_v4(), event("test")).await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(inner.is_empty());
    }

    #[tokio::test]
    async fn test_background_store_failure_is_swallowed() {
        let recorder = AnalyticsRecorder::new(
            Arc::new(FailingStore),
            Arc::new(ManualClock::new(Utc::now())),
            AnalyticsConfig::default(),
        );
        recorder.record(Uuid::new_v4(), event("test")).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(recorder.summary(7).await.unwrap().top_queries.is_empty());
    }

    #[tokio::test]
    async fn test_summary_period() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let recorder = AnalyticsRecorder::new(Arc::new(InMemoryAnalyticsStore::new()), clock.clone(), inline());

        recorder.record(Uuid::new_v4(), event("old")).await;
        clock.advance(ChronoDuration::days(10));
        recorder.record(Uuid::new_v4(), event("new")).await;

        let summary = recorder.summary(7).await.unwrap();
        assert_eq!(summary.metrics.total_searches, 1);
        assert_eq!(summary.top_queries[0].normalized_query, "new");

        assert_eq!(recorder.summary(30).await.unwrap().metrics.total_searches, 2);
        assert!(matches!(recorder.summary(0).await, Err(AnalyticsError::InvalidPeriod(0))));
        assert!(recorder.summary(366).await.is_err());
    }
}
