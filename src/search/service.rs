//! Search orchestration: normalize, cache, execute, rank, record

use crate::analytics::{
    advise, AnalyticsConfig, AnalyticsRecorder, Advisory, InMemoryAnalyticsStore, RequestContext,
    SearchEvent,
};
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::history::SearchHistory;
use crate::metrics::{AtomicSearchMetrics, SearchMetrics};
use crate::models::{Category, ResultRecord, ResultType, SearchMetadata};
use crate::search::aggregator::aggregate;
use crate::search::cache::SearchCache;
use crate::search::config::{BackendKind, CacheConfig, SearchConfig};
use crate::search::error::{SearchError, SearchResult};
use crate::search::executor::SearchExecutor;
use crate::search::highlight::{highlight_terms, snippet};
use crate::search::index::NativeFullTextStrategy;
use crate::search::normalizer::QueryNormalizer;
use crate::search::query::{ContentType, SearchQuery, SearchRequest, SortBy};
use crate::search::ranking::{explain, RankingEngine};
use crate::search::strategy::{BackendCapability, PortableSubstringStrategy, SearchStrategy};
use crate::state::{CacheBackend, ForumStore, MokaCacheBackend};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Highlighted snippets are cut to this many characters
const HIGHLIGHT_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorView {
    pub id: u64,
    pub display_name: String,
    pub profile_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighlightView {
    pub title: String,
    pub content: String,
}

/// One result as returned to API clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub id: u64,
    #[serde(rename = "type")]
    pub result_type: ResultType,
    pub title: String,
    pub content: String,
    pub url: String,
    pub relevance_score: f64,
    pub category: String,
    pub subcategory: String,
    pub created_at: Option<DateTime<Utc>>,
    pub author: Option<AuthorView>,
    pub metadata: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<HighlightView>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    pub has_next: bool,
    pub has_previous: bool,
    pub next_offset: Option<usize>,
    pub previous_offset: Option<usize>,
    pub page_size: usize,
    pub total_pages: usize,
}

impl Pagination {
    pub fn new(total: usize, offset: usize, limit: usize) -> Self {
        let has_next = offset + limit < total;
        let has_previous = offset > 0;
        Self {
            has_next,
            has_previous,
            next_offset: has_next.then_some(offset + limit),
            previous_offset: has_previous.then(|| offset.saturating_sub(limit)),
            page_size: limit,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub success: bool,

    /// Identifier for click reports on this search
    pub search_id: Uuid,

    pub query: String,
    pub content_type: ContentType,
    pub sort_by: SortBy,
    pub total_results: usize,
    pub returned_results: usize,
    pub offset: usize,
    pub limit: usize,
    pub search_time_ms: u64,
    pub database_hits: u32,
    pub cached: bool,
    pub results: Vec<SearchHit>,
    pub pagination: Pagination,
    pub diagnostics: Vec<Advisory>,
}

/// Build the matching backend named in the configuration
pub async fn build_strategy(
    store: Arc<dyn ForumStore>,
    config: &SearchConfig,
) -> SearchResult<Arc<dyn SearchStrategy>> {
    let strategy: Arc<dyn SearchStrategy> = match config.backend {
        BackendKind::Portable => Arc::new(PortableSubstringStrategy::new(store)),
        BackendKind::Native => Arc::new(NativeFullTextStrategy::new(store, config).await?),
    };
    tracing::info!(backend = ?strategy.capability(), "Search backend ready");
    Ok(strategy)
}

/// Unified forum search
pub struct SearchService {
    store: Arc<dyn ForumStore>,
    normalizer: QueryNormalizer,
    executor: SearchExecutor,
    ranking: RankingEngine,
    cache: SearchCache,
    metrics: Arc<dyn SearchMetrics>,
    analytics: Arc<AnalyticsRecorder>,
    history: Arc<SearchHistory>,
}

impl SearchService {
    pub fn builder(store: Arc<dyn ForumStore>, strategy: Arc<dyn SearchStrategy>) -> SearchServiceBuilder {
        SearchServiceBuilder::new(store, strategy)
    }

    pub fn capability(&self) -> BackendCapability {
        self.executor.capability()
    }

    pub fn metrics(&self) -> &Arc<dyn SearchMetrics> {
        &self.metrics
    }

    pub fn analytics(&self) -> &Arc<AnalyticsRecorder> {
        &self.analytics
    }

    pub fn history(&self) -> &Arc<SearchHistory> {
        &self.history
    }

    pub async fn cached_entries(&self) -> u64 {
        self.cache.entry_count().await
    }

    /// Run a search end to end
    pub async fn search(&self, request: &SearchRequest, context: RequestContext) -> Result<SearchResponse> {
        let started = Instant::now();
        let search_id = Uuid::new_v4();

        let query = self.normalizer.normalize(request)?;
        let category = self.resolve_category(&query).await?;

        let fingerprint = query.fingerprint();
        let cacheable = self.cache.should_cache(&query.normalized, query.content_type);
        let cached = if cacheable {
            self.cache.get(&fingerprint).await
        } else {
            None
        };

        let (results, metadata, cache_hit) = match cached {
            Some(entry) => (entry.results, entry.metadata, true),
            None => {
                let (results, metadata) = self.compute(&query, category.as_ref(), started).await?;
                if cacheable {
                    self.cache.set(&fingerprint, results.clone(), metadata).await;
                }
                (results, metadata, false)
            }
        };

        let elapsed = started.elapsed();
        self.metrics.record_search(&query.content_type.to_string(), elapsed);

        let total_results = results.len();
        self.analytics
            .record(
                search_id,
                SearchEvent {
                    query: query.text.clone(),
                    normalized_query: query.analytics_key.clone(),
                    content_type: query.content_type,
                    sort_by: query.sort_by,
                    results_count: total_results,
                    search_time_ms: metadata.search_time_ms,
                    database_hits: metadata.database_hits,
                    filters_used: query.filters.used(),
                    cache_hit,
                    context: context.clone(),
                },
            )
            .await;

        if let Some(user_id) = context.user_id {
            self.history.record(user_id, &query.text, query.content_type, total_results);
        }

        let hits: Vec<SearchHit> = results
            .iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|record| to_hit(record, &query))
            .collect();

        tracing::info!(
            search_id = %search_id,
            query = %query.normalized,
            content_type = %query.content_type,
            sort_by = %query.sort_by,
            total_results,
            cached = cache_hit,
            elapsed_ms = elapsed.as_millis() as u64,
            "Search completed"
        );

        Ok(SearchResponse {
            success: true,
            search_id,
            query: query.text.clone(),
            content_type: query.content_type,
            sort_by: query.sort_by,
            total_results,
            returned_results: hits.len(),
            offset: query.offset,
            limit: query.limit,
            search_time_ms: elapsed.as_millis() as u64,
            database_hits: metadata.database_hits,
            cached: cache_hit,
            results: hits,
            pagination: Pagination::new(total_results, query.offset, query.limit),
            diagnostics: advise(metadata.search_time_ms, total_results, metadata.database_hits),
        })
    }

    async fn resolve_category(&self, query: &SearchQuery) -> SearchResult<Option<Category>> {
        let Some(slug) = query.filters.category.as_deref() else {
            return Ok(None);
        };
        match self.store.find_category_by_slug(slug).await? {
            Some(category) => Ok(Some(category)),
            None => Err(SearchError::UnsupportedOption(format!("Unknown category: {}", slug))),
        }
    }

    async fn compute(
        &self,
        query: &SearchQuery,
        category: Option<&Category>,
        started: Instant,
    ) -> SearchResult<(Vec<ResultRecord>, SearchMetadata)> {
        let outcome = self.executor.execute(query, category).await?;
        let mut results = aggregate(outcome.per_type);

        if query.sort_by == SortBy::Relevance {
            results = self.ranking.rank(results, &query.normalized, query.content_type);
        } else {
            self.executor.sort_results(&mut results, query);
        }

        let metadata = SearchMetadata {
            search_time_ms: started.elapsed().as_millis() as u64,
            database_hits: outcome.database_hits,
            total_results: results.len(),
        };
        Ok((results, metadata))
    }
}

fn to_hit(record: &ResultRecord, query: &SearchQuery) -> SearchHit {
    let signals = &record.signals;
    let mut metadata = match record.result_type {
        ResultType::Thread => json!({
            "post_count": signals.post_count,
            "view_count": signals.view_count,
            "is_pinned": signals.is_pinned,
            "is_locked": signals.is_locked,
        }),
        ResultType::User => json!({
            "location": signals.location,
            "join_date": signals.joined_at,
        }),
        _ => json!({}),
    };
    if let Some(score) = &record.score {
        metadata["ranking_explanation"] = json!(explain(score));
    }

    let highlight = query.highlight.then(|| HighlightView {
        title: highlight_terms(&record.title, &query.text),
        content: snippet(&record.content, &query.text, HIGHLIGHT_SNIPPET_CHARS),
    });

    SearchHit {
        id: record.id,
        result_type: record.result_type,
        title: record.title.clone(),
        content: record.content.clone(),
        url: record.url.clone(),
        relevance_score: record.total_score(),
        category: record.category.clone(),
        subcategory: record.subcategory.clone(),
        created_at: record.created_at,
        author: record.author.as_ref().map(|author| AuthorView {
            id: author.id,
            display_name: author.display_name.clone(),
            profile_url: author.profile_url(),
        }),
        metadata,
        highlight,
    }
}

/// Assembles a [`SearchService`]; every collaborator but the store and
/// strategy has an in-memory default
pub struct SearchServiceBuilder {
    store: Arc<dyn ForumStore>,
    strategy: Arc<dyn SearchStrategy>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<dyn SearchMetrics>>,
    cache_backend: Option<Arc<dyn CacheBackend>>,
    analytics: Option<Arc<AnalyticsRecorder>>,
    history: Option<Arc<SearchHistory>>,
    search_config: SearchConfig,
    cache_config: CacheConfig,
    analytics_config: AnalyticsConfig,
}

impl SearchServiceBuilder {
    pub fn new(store: Arc<dyn ForumStore>, strategy: Arc<dyn SearchStrategy>) -> Self {
        Self {
            store,
            strategy,
            clock: Arc::new(SystemClock),
            metrics: None,
            cache_backend: None,
            analytics: None,
            history: None,
            search_config: SearchConfig::default(),
            cache_config: CacheConfig::default(),
            analytics_config: AnalyticsConfig::default(),
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn SearchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.cache_backend = Some(backend);
        self
    }

    pub fn analytics(mut self, analytics: Arc<AnalyticsRecorder>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    pub fn history(mut self, history: Arc<SearchHistory>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn search_config(mut self, config: SearchConfig) -> Self {
        self.search_config = config;
        self
    }

    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Used only when no recorder is supplied
    pub fn analytics_config(mut self, config: AnalyticsConfig) -> Self {
        self.analytics_config = config;
        self
    }

    pub fn build(self) -> SearchService {
        let metrics = self
            .metrics
            .unwrap_or_else(|| Arc::new(AtomicSearchMetrics::new()));
        let cache_backend = self
            .cache_backend
            .unwrap_or_else(|| Arc::new(MokaCacheBackend::new(self.cache_config.max_capacity)));
        let analytics = self.analytics.unwrap_or_else(|| {
            Arc::new(AnalyticsRecorder::new(
                Arc::new(InMemoryAnalyticsStore::new()),
                self.clock.clone(),
                self.analytics_config.clone(),
            ))
        });
        let history = self
            .history
            .unwrap_or_else(|| Arc::new(SearchHistory::new(self.clock.clone())));

        SearchService {
            normalizer: QueryNormalizer::new(self.clock.clone()),
            executor: SearchExecutor::new(
                self.store.clone(),
                self.strategy,
                self.clock.clone(),
                Duration::from_millis(self.search_config.deadline_ms),
            )
            .with_max_results(self.search_config.max_results_per_type),
            ranking: RankingEngine::new(self.clock.clone()),
            cache: SearchCache::new(cache_backend, metrics.clone(), self.clock, self.cache_config),
            store: self.store,
            metrics,
            analytics,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let page = Pagination::new(45, 0, 20);
        assert!(page.has_next);
        assert!(!page.has_previous);
        assert_eq!(page.next_offset, Some(20));
        assert_eq!(page.previous_offset, None);
        assert_eq!(page.total_pages, 3);

        let last = Pagination::new(45, 40, 20);
        assert!(!last.has_next);
        assert_eq!(last.next_offset, None);
        assert_eq!(last.previous_offset, Some(20));

        let partial = Pagination::new(45, 10, 20);
        assert_eq!(partial.previous_offset, Some(0));

        assert_eq!(Pagination::new(0, 0, 20).total_pages, 0);
    }
}
