//! Search event records

use crate::models::ResultType;
use crate::search::{ContentType, SortBy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use uuid::Uuid;

pub const MAX_QUERY_CHARS: usize = 200;
pub const MAX_USER_AGENT_CHARS: usize = 500;
pub const MAX_REFERRER_CHARS: usize = 200;
pub const MAX_SESSION_KEY_CHARS: usize = 40;

/// Where a search request came from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestContext {
    pub session_id: String,
    pub user_id: Option<u64>,
    pub user_agent: Option<String>,
    pub ip: Option<IpAddr>,
    pub referrer: Option<String>,
}

/// A completed search, as reported by the search service
#[derive(Debug, Clone, PartialEq)]
pub struct SearchEvent {
    pub query: String,
    pub normalized_query: String,
    pub content_type: ContentType,
    pub sort_by: SortBy,
    pub results_count: usize,
    pub search_time_ms: u64,
    pub database_hits: u32,
    pub filters_used: BTreeMap<String, String>,
    pub cache_hit: bool,
    pub context: RequestContext,
}

/// What the user clicked after searching
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClickFeedback {
    pub position: u32,
    pub result_type: ResultType,
    pub time_to_click_ms: Option<u64>,
}

/// Stored search event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsRecord {
    pub id: Uuid,
    pub session_id: String,
    pub user_id: Option<u64>,
    pub query: String,
    pub normalized_query: String,
    pub content_type: ContentType,
    pub sort_by: SortBy,
    pub results_count: usize,
    pub search_time_ms: u64,
    pub database_hits: u32,
    pub filters_used: BTreeMap<String, String>,
    pub cache_hit: bool,
    pub clicked_result_position: Option<u32>,
    pub clicked_result_type: Option<ResultType>,
    pub time_to_click_ms: Option<u64>,
    pub user_agent: String,
    pub ip_address: Option<IpAddr>,
    pub referrer: String,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsRecord {
    pub fn from_event(id: Uuid, event: SearchEvent, created_at: DateTime<Utc>) -> Self {
        let context = event.context;
        Self {
            id,
            session_id: truncate(&context.session_id, MAX_SESSION_KEY_CHARS),
            user_id: context.user_id,
            query: truncate(&event.query, MAX_QUERY_CHARS),
            normalized_query: truncate(&event.normalized_query, MAX_QUERY_CHARS),
            content_type: event.content_type,
            sort_by: event.sort_by,
            results_count: event.results_count,
            search_time_ms: event.search_time_ms,
            database_hits: event.database_hits,
            filters_used: event.filters_used,
            cache_hit: event.cache_hit,
            clicked_result_position: None,
            clicked_result_type: None,
            time_to_click_ms: None,
            user_agent: truncate(context.user_agent.as_deref().unwrap_or_default(), MAX_USER_AGENT_CHARS),
            ip_address: context.ip.map(anonymize_ip),
            referrer: truncate(context.referrer.as_deref().unwrap_or_default(), MAX_REFERRER_CHARS),
            created_at,
        }
    }

    /// Overwrite the click fields with the latest report
    pub fn apply_click(&mut self, click: ClickFeedback) {
        self.clicked_result_position = Some(click.position);
        self.clicked_result_type = Some(click.result_type);
        self.time_to_click_ms = click.time_to_click_ms;
    }

    pub fn clicked(&self) -> bool {
        self.clicked_result_position.map_or(false, |p| p > 0)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Zero the last octet of IPv4 addresses; IPv6 addresses are kept
pub fn anonymize_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            IpAddr::from([a, b, c, 0])
        }
        IpAddr::V6(_) => ip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(query: &str) -> SearchEvent {
        SearchEvent {
            query: query.into(),
            normalized_query: query.to_lowercase(),
            content_type: ContentType::All,
            sort_by: SortBy::Relevance,
            results_count: 3,
            search_time_ms: 12,
            database_hits: 5,
            filters_used: BTreeMap::new(),
            cache_hit: false,
            context: RequestContext {
                session_id: "s".repeat(64),
                user_id: None,
                user_agent: Some("a".repeat(600)),
                ip: Some("203.0.113.77".parse().unwrap()),
                referrer: Some("r".repeat(300)),
            },
        }
    }

    #[test]
    fn test_record_truncates_and_anonymizes() {
        let record = AnalyticsRecord::from_event(Uuid::new_v4(), event(&"q".repeat(250)), Utc::now());

        assert_eq!(record.query.chars().count(), 200);
        assert_eq!(record.user_agent.chars().count(), 500);
        assert_eq!(record.referrer.chars().count(), 200);
        assert_eq!(record.session_id.chars().count(), 40);
        assert_eq!(record.ip_address, Some("203.0.113.0".parse().unwrap()));
    }

    #[test]
    fn test_ipv6_kept() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(anonymize_ip(ip), ip);
    }

    #[test]
    fn test_click_last_write_wins() {
        let mut record = AnalyticsRecord::from_event(Uuid::new_v4(), event("test"), Utc::now());
        assert!(!record.clicked());

        record.apply_click(ClickFeedback {
            position: 1,
            result_type: ResultType::Post,
            time_to_click_ms: Some(900),
        });
        record.apply_click(ClickFeedback {
            position: 3,
            result_type: ResultType::Thread,
            time_to_click_ms: None,
        });

        assert!(record.clicked());
        assert_eq!(record.clicked_result_position, Some(3));
        assert_eq!(record.clicked_result_type, Some(ResultType::Thread));
        assert_eq!(record.time_to_click_ms, None);
    }
}
