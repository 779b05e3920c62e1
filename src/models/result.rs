use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of entity a search result points at
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResultType {
    Post,
    Thread,
    User,
    Category,
    Subcategory,
}

impl ResultType {
    /// Fixed per-type preference used by the ranking engine
    pub fn base_priority(&self) -> f64 {
        match self {
            ResultType::Thread => 10.0,
            ResultType::Post => 8.0,
            ResultType::User => 5.0,
            ResultType::Subcategory => 4.0,
            ResultType::Category => 3.0,
        }
    }
}

/// Author summary attached to posts, threads and user results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorRef {
    pub id: u64,
    pub display_name: String,
}

impl AuthorRef {
    pub fn profile_url(&self) -> String {
        format!("/accounts/user/{}/", self.id)
    }
}

/// Entity-specific signals read by the ranking engine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntitySignals {
    pub vote_count: i64,
    pub view_count: u64,
    pub post_count: u64,
    /// Character length of the full post body, before snippet truncation
    pub body_length: usize,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub location: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Per-factor scores and their weighted total
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub relevance: f64,
    pub popularity: f64,
    pub freshness: f64,
    pub type_priority: f64,
    pub quality: f64,
    pub total: f64,
}

/// One matched entity, normalized across types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    #[serde(rename = "type")]
    pub result_type: ResultType,
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author: Option<AuthorRef>,
    pub created_at: Option<DateTime<Utc>>,
    pub url: String,
    pub category: String,
    pub subcategory: String,
    /// Raw backend rank: BM25 score or a constant for substring matches
    pub rank: f64,
    pub signals: EntitySignals,
    pub score: Option<ScoreBreakdown>,
}

impl ResultRecord {
    /// Score used for presentation; falls back to the backend rank before ranking
    pub fn total_score(&self) -> f64 {
        self.score.map(|s| s.total).unwrap_or(self.rank)
    }
}

/// Timing and size of the search that produced a cache entry
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchMetadata {
    pub search_time_ms: u64,
    pub database_hits: u32,
    pub total_results: usize,
}

/// Ranked results stored under a fingerprint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub results: Vec<ResultRecord>,
    pub cached_at: DateTime<Utc>,
    pub ttl_secs: u64,
    pub metadata: SearchMetadata,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.cached_at + chrono::Duration::seconds(self.ttl_secs as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_result_type_parsing() {
        assert_eq!(ResultType::from_str("subcategory").unwrap(), ResultType::Subcategory);
        assert_eq!(ResultType::Thread.to_string(), "thread");
        assert!(ResultType::from_str("forum").is_err());
    }

    #[test]
    fn test_cache_entry_expiry_boundary() {
        let now = Utc::now();
        let entry = CacheEntry {
            fingerprint: "abc".to_string(),
            results: vec![],
            cached_at: now,
            ttl_secs: 150,
            metadata: SearchMetadata::default(),
        };

        assert!(!entry.is_expired(now + chrono::Duration::seconds(149)));
        assert!(entry.is_expired(now + chrono::Duration::seconds(150)));
    }
}
