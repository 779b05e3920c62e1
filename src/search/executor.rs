//! Per-type search execution

use crate::clock::Clock;
use crate::models::{Category, ResultRecord, ResultType, User};
use crate::search::document::{
    category_record, post_record, subcategory_record, thread_record, user_record,
};
use crate::search::config::SearchConfig;
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::{ContentType, SearchFilter, SearchQuery, SortBy};
use crate::search::strategy::{BackendCapability, SearchStrategy, TextMatch};
use crate::state::ForumStore;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;

/// Results of one execution, grouped by type in merge order
#[derive(Debug, Clone, Default)]
pub struct ExecutionOutcome {
    pub per_type: Vec<(ResultType, Vec<ResultRecord>)>,

    /// Number of backend queries issued
    pub database_hits: u32,
}

/// Runs the per-type searches of a query through a [`SearchStrategy`]
pub struct SearchExecutor {
    store: Arc<dyn ForumStore>,
    strategy: Arc<dyn SearchStrategy>,
    clock: Arc<dyn Clock>,
    deadline: Duration,
    max_results: usize,
}

impl SearchExecutor {
    pub fn new(
        store: Arc<dyn ForumStore>,
        strategy: Arc<dyn SearchStrategy>,
        clock: Arc<dyn Clock>,
        deadline: Duration,
    ) -> Self {
        Self {
            store,
            strategy,
            clock,
            deadline,
            max_results: SearchConfig::default().max_results_per_type,
        }
    }

    /// Cap on the filtered results of each per-type search
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn capability(&self) -> BackendCapability {
        self.strategy.capability()
    }

    /// Search every type `query.content_type` covers, concurrently, within the deadline.
    /// `category` is the resolved category filter, if any.
    pub async fn execute(
        &self,
        query: &SearchQuery,
        category: Option<&Category>,
    ) -> SearchResult<ExecutionOutcome> {
        tokio::time::timeout(self.deadline, self.run(query, category))
            .await
            .map_err(|_| SearchError::Timeout(self.deadline.as_millis() as u64))?
    }

    async fn run(&self, query: &SearchQuery, category: Option<&Category>) -> SearchResult<ExecutionOutcome> {
        let terms = query.terms();
        let kinds = query.content_type.result_types();

        let searches = kinds
            .iter()
            .map(|kind| self.search_type(*kind, &terms, &query.filters, category));
        let per_type = try_join_all(searches).await?;

        Ok(ExecutionOutcome {
            per_type: kinds.iter().copied().zip(per_type).collect(),
            database_hits: kinds.len() as u32,
        })
    }

    async fn search_type(
        &self,
        kind: ResultType,
        terms: &[String],
        filters: &SearchFilter,
        category: Option<&Category>,
    ) -> SearchResult<Vec<ResultRecord>> {
        let matches = self.strategy.text_search(kind, terms).await?;

        let mut records = Vec::with_capacity(matches.len().min(self.max_results));
        for text_match in matches {
            if records.len() >= self.max_results {
                break;
            }
            let record = match kind {
                ResultType::Post => self.post(text_match, filters, category).await?,
                ResultType::Thread => self.thread(text_match, filters, category).await?,
                ResultType::User => self.user(text_match, filters).await?,
                ResultType::Category => self.category(text_match, category).await?,
                ResultType::Subcategory => self.subcategory(text_match, category).await?,
            };
            records.extend(record);
        }
        Ok(records)
    }

    async fn post(
        &self,
        text_match: TextMatch,
        filters: &SearchFilter,
        category_filter: Option<&Category>,
    ) -> SearchResult<Option<ResultRecord>> {
        let Some(post) = self.store.get_post(text_match.id).await? else {
            return Ok(None);
        };
        if !within_dates(post.created_at, filters) {
            return Ok(None);
        }
        let Some(thread) = self.store.get_thread(post.thread_id).await? else {
            tracing::warn!(post_id = post.id, thread_id = post.thread_id, "Post references a missing thread");
            return Ok(None);
        };
        let Some((subcategory, category)) = self.placement(thread.subcategory_id).await? else {
            return Ok(None);
        };
        if matches!(category_filter, Some(c) if c.id != category.id) {
            return Ok(None);
        }
        let author = self.store.get_user(post.author_id).await?;
        if !author_matches(author.as_ref(), filters) {
            return Ok(None);
        }

        Ok(Some(post_record(
            &post,
            &thread,
            &subcategory,
            &category,
            author.as_ref(),
            text_match.rank,
        )))
    }

    async fn thread(
        &self,
        text_match: TextMatch,
        filters: &SearchFilter,
        category_filter: Option<&Category>,
    ) -> SearchResult<Option<ResultRecord>> {
        let Some(thread) = self.store.get_thread(text_match.id).await? else {
            return Ok(None);
        };
        if !within_dates(thread.created_at, filters) {
            return Ok(None);
        }
        let Some((subcategory, category)) = self.placement(thread.subcategory_id).await? else {
            return Ok(None);
        };
        if matches!(category_filter, Some(c) if c.id != category.id) {
            return Ok(None);
        }
        let author = self.store.get_user(thread.author_id).await?;
        if !author_matches(author.as_ref(), filters) {
            return Ok(None);
        }

        Ok(Some(thread_record(
            &thread,
            &subcategory,
            &category,
            author.as_ref(),
            text_match.rank,
        )))
    }

    async fn user(&self, text_match: TextMatch, filters: &SearchFilter) -> SearchResult<Option<ResultRecord>> {
        let Some(user) = self.store.get_user(text_match.id).await? else {
            return Ok(None);
        };
        if !user.is_active
            || !within_dates(user.date_joined, filters)
            || !author_matches(Some(&user), filters)
        {
            return Ok(None);
        }
        Ok(Some(user_record(&user, text_match.rank)))
    }

    async fn category(
        &self,
        text_match: TextMatch,
        category_filter: Option<&Category>,
    ) -> SearchResult<Option<ResultRecord>> {
        if matches!(category_filter, Some(c) if c.id != text_match.id) {
            return Ok(None);
        }
        let category = self.store.get_category(text_match.id).await?;
        Ok(category.map(|c| category_record(&c, text_match.rank)))
    }

    async fn subcategory(
        &self,
        text_match: TextMatch,
        category_filter: Option<&Category>,
    ) -> SearchResult<Option<ResultRecord>> {
        let Some(subcategory) = self.store.get_subcategory(text_match.id).await? else {
            return Ok(None);
        };
        if matches!(category_filter, Some(c) if c.id != subcategory.category_id) {
            return Ok(None);
        }
        let Some(category) = self.store.get_category(subcategory.category_id).await? else {
            tracing::warn!(subcategory_id = subcategory.id, "Subcategory references a missing category");
            return Ok(None);
        };
        Ok(Some(subcategory_record(&subcategory, &category, text_match.rank)))
    }

    async fn placement(
        &self,
        subcategory_id: u64,
    ) -> SearchResult<Option<(crate::models::Subcategory, Category)>> {
        let Some(subcategory) = self.store.get_subcategory(subcategory_id).await? else {
            tracing::warn!(subcategory_id, "Thread references a missing subcategory");
            return Ok(None);
        };
        let Some(category) = self.store.get_category(subcategory.category_id).await? else {
            tracing::warn!(subcategory_id, "Subcategory references a missing category");
            return Ok(None);
        };
        Ok(Some((subcategory, category)))
    }

    /// Order merged results for every `sort_by` other than relevance.
    /// Relevance ordering belongs to the ranking engine.
    pub fn sort_results(&self, records: &mut [ResultRecord], query: &SearchQuery) {
        if query.sort_by == SortBy::Relevance {
            return;
        }
        if query.content_type == ContentType::Categories {
            records.sort_by(|a, b| a.title.cmp(&b.title));
            return;
        }

        let now = self.clock.now();
        match query.sort_by {
            SortBy::DateDesc => records.sort_by(|a, b| date_or(b, now).cmp(&date_or(a, now))),
            SortBy::DateAsc => records.sort_by(|a, b| date_or(a, now).cmp(&date_or(b, now))),
            SortBy::Author => records.sort_by(|a, b| author_key(a).cmp(author_key(b))),
            SortBy::Relevance => {}
        }
    }
}

fn date_or(record: &ResultRecord, now: DateTime<Utc>) -> DateTime<Utc> {
    record.created_at.unwrap_or(now)
}

fn author_key(record: &ResultRecord) -> &str {
    record
        .author
        .as_ref()
        .map(|a| a.display_name.as_str())
        .unwrap_or("Z")
}

/// Whole-day inclusive date window check
fn within_dates(created_at: DateTime<Utc>, filters: &SearchFilter) -> bool {
    let day = created_at.date_naive();
    filters.date_from.map_or(true, |from| day >= from) && filters.date_to.map_or(true, |to| day <= to)
}

fn author_matches(user: Option<&User>, filters: &SearchFilter) -> bool {
    let Some(needle) = filters.author.as_deref() else {
        return true;
    };
    let needle = needle.to_lowercase();
    user.map_or(false, |u| {
        u.display_name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
    })
}
