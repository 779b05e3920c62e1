//! Per-user search history and saved searches.
//!
//! Identity comes from the caller; both stores only key by user id.

mod saved;

pub use saved::{SaveSearchRequest, SavedSearch, SavedSearches, MAX_NAME_CHARS};

use crate::clock::Clock;
use crate::search::ContentType;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub const MAX_HISTORY_QUERY_CHARS: usize = 200;
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const MAX_HISTORY_LIMIT: usize = 50;

/// Repeat searches inside this window update the earlier entry
const DEDUPE_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHistoryEntry {
    pub id: Uuid,
    pub user_id: u64,
    pub query: String,
    pub content_type: ContentType,
    pub results_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopularSearch {
    pub query: String,
    pub search_count: usize,
}

pub struct SearchHistory {
    entries: DashMap<u64, Vec<SearchHistoryEntry>>,
    clock: Arc<dyn Clock>,
}

impl SearchHistory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Record a search. Blank queries are ignored.
    pub fn record(
        &self,
        user_id: u64,
        query: &str,
        content_type: ContentType,
        results_count: usize,
    ) -> Option<SearchHistoryEntry> {
        let query: String = query.trim().chars().take(MAX_HISTORY_QUERY_CHARS).collect();
        if query.is_empty() {
            return None;
        }

        let now = self.clock.now();
        let cutoff = now - Duration::minutes(DEDUPE_WINDOW_MINUTES);
        let mut entries = self.entries.entry(user_id).or_default();

        if let Some(recent) = entries.iter_mut().find(|e| {
            e.query == query && e.content_type == content_type && e.created_at >= cutoff
        }) {
            recent.results_count = results_count;
            recent.updated_at = now;
            return Some(recent.clone());
        }

        let entry = SearchHistoryEntry {
            id: Uuid::new_v4(),
            user_id,
            query,
            content_type,
            results_count,
            created_at: now,
            updated_at: now,
        };
        entries.push(entry.clone());
        Some(entry)
    }

    /// Newest first
    pub fn recent(&self, user_id: u64, limit: usize) -> Vec<SearchHistoryEntry> {
        let Some(entries) = self.entries.get(&user_id) else {
            return Vec::new();
        };
        let mut recent = entries.clone();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        recent
    }

    /// Most frequent queries across all users, ties alphabetical
    pub fn popular(&self, limit: usize) -> Vec<PopularSearch> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for entries in self.entries.iter() {
            for entry in entries.iter() {
                *counts.entry(entry.query.clone()).or_default() += 1;
            }
        }

        let mut popular: Vec<PopularSearch> = counts
            .into_iter()
            .map(|(query, search_count)| PopularSearch { query, search_count })
            .collect();
        popular.sort_by(|a, b| b.search_count.cmp(&a.search_count).then_with(|| a.query.cmp(&b.query)));
        popular.truncate(limit);
        popular
    }

    /// Delete a user's history, returning how many entries went
    pub fn clear(&self, user_id: u64) -> usize {
        self.entries
            .remove(&user_id)
            .map(|(_, entries)| entries.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn history() -> (SearchHistory, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (SearchHistory::new(clock.clone()), clock)
    }

    #[test]
    fn test_blank_query_ignored() {
        let (history, _) = history();
        assert!(history.record(1, "   ", ContentType::All, 0).is_none());
        assert!(history.recent(1, 10).is_empty());
    }

    #[test]
    fn test_dedupes_within_an_hour() {
        let (history, clock) = history();
        let first = history.record(1, " python ", ContentType::All, 3).unwrap();

        clock.advance(Duration::minutes(59));
        let again = history.record(1, "python", ContentType::All, 7).unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.results_count, 7);
        assert!(again.updated_at > first.updated_at);

        // A different content type is a separate search
        history.record(1, "python", ContentType::Threads, 1);
        assert_eq!(history.recent(1, 10).len(), 2);

        clock.advance(Duration::minutes(2));
        let later = history.record(1, "python", ContentType::All, 7).unwrap();
        assert_ne!(later.id, first.id);
        assert_eq!(history.recent(1, 10).len(), 3);
    }

    #[test]
    fn test_recent_newest_first_and_limited() {
        let (history, clock) = history();
        for query in ["one", "two", "three"] {
            history.record(1, query, ContentType::All, 1);
            clock.advance(Duration::seconds(1));
        }
        let queries: Vec<String> = history.recent(1, 2).into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["three", "two"]);
    }

    #[test]
    fn test_popular_across_users() {
        let (history, _) = history();
        history.record(1, "rust", ContentType::All, 1);
        history.record(2, "rust", ContentType::All, 1);
        history.record(2, "python", ContentType::All, 1);
        history.record(3, "go", ContentType::All, 1);

        let popular = history.popular(2);
        assert_eq!(
            popular,
            vec![
                PopularSearch {
                    query: "rust".into(),
                    search_count: 2
                },
                PopularSearch {
                    query: "go".into(),
                    search_count: 1
                },
            ]
        );
    }

    #[test]
    fn test_clear() {
        let (history, _) = history();
        history.record(1, "rust", ContentType::All, 1);
        history.record(1, "python", ContentType::All, 1);
        history.record(2, "go", ContentType::All, 1);

        assert_eq!(history.clear(1), 2);
        assert_eq!(history.clear(1), 0);
        assert_eq!(history.recent(2, 10).len(), 1);
    }
}
