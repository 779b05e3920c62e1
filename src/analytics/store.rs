//! Storage of search events

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use crate::analytics::models::{AnalyticsRecord, ClickFeedback};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn insert(&self, record: AnalyticsRecord) -> AnalyticsResult<()>;

    async fn get(&self, id: Uuid) -> AnalyticsResult<Option<AnalyticsRecord>>;

    /// Overwrite the click fields of an existing record
    async fn set_click(&self, id: Uuid, click: ClickFeedback) -> AnalyticsResult<()>;

    /// Records created at or after `since`, oldest first
    async fn since(&self, since: DateTime<Utc>) -> AnalyticsResult<Vec<AnalyticsRecord>>;
}

/// In-memory analytics store
#[derive(Clone, Default)]
pub struct InMemoryAnalyticsStore {
    records: Arc<DashMap<Uuid, AnalyticsRecord>>,
}

impl InMemoryAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn insert(&self, record: AnalyticsRecord) -> AnalyticsResult<()> {
        self.records.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> AnalyticsResult<Option<AnalyticsRecord>> {
        Ok(self.records.get(&id).map(|r| r.clone()))
    }

    async fn set_click(&self, id: Uuid, click: ClickFeedback) -> AnalyticsResult<()> {
        let mut record = self
            .records
            .get_mut(&id)
            .ok_or(AnalyticsError::RecordNotFound(id))?;
        record.apply_click(click);
        Ok(())
    }

    async fn since(&self, since: DateTime<Utc>) -> AnalyticsResult<Vec<AnalyticsRecord>> {
        let mut records: Vec<AnalyticsRecord> = self
            .records
            .iter()
            .filter(|r| r.created_at >= since)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }
}
