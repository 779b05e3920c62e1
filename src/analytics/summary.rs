//! Aggregate search analytics over a reporting period

use crate::analytics::models::AnalyticsRecord;
use crate::search::ContentType;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_PERIOD_DAYS: i64 = 7;
pub const MAX_PERIOD_DAYS: i64 = 365;
const TOP_QUERY_COUNT: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceSummary {
    pub avg_search_time_ms: f64,
    pub avg_results_count: f64,
    pub avg_database_hits: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryMetrics {
    pub total_searches: usize,
    pub unique_users: usize,
    pub unique_sessions: usize,

    /// Percentage of searches followed by a click
    pub click_through_rate: f64,

    /// Percentage of searches that found nothing
    pub zero_result_rate: f64,

    pub performance: PerformanceSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopQuery {
    pub normalized_query: String,
    pub search_count: usize,
    pub avg_results: f64,
    pub avg_time_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentTypeCount {
    pub content_type: ContentType,
    pub search_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsSummary {
    pub period_days: i64,
    pub metrics: SummaryMetrics,
    pub top_queries: Vec<TopQuery>,
    pub content_type_distribution: Vec<ContentTypeCount>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 / total as f64 * 100.0)
    }
}

fn mean<I: Iterator<Item = f64>>(values: I, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        round2(values.sum::<f64>() / count as f64)
    }
}

/// Summarize `records`, which must already be limited to the period
pub fn summarize(records: &[AnalyticsRecord], period_days: i64) -> AnalyticsSummary {
    let total = records.len();

    let unique_users = records
        .iter()
        .filter_map(|r| r.user_id)
        .collect::<HashSet<_>>()
        .len();
    let unique_sessions = records
        .iter()
        .map(|r| r.session_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let clicked = records.iter().filter(|r| r.clicked()).count();
    let zero_results = records.iter().filter(|r| r.results_count == 0).count();

    let metrics = SummaryMetrics {
        total_searches: total,
        unique_users,
        unique_sessions,
        click_through_rate: percent(clicked, total),
        zero_result_rate: percent(zero_results, total),
        performance: PerformanceSummary {
            avg_search_time_ms: mean(records.iter().map(|r| r.search_time_ms as f64), total),
            avg_results_count: mean(records.iter().map(|r| r.results_count as f64), total),
            avg_database_hits: mean(records.iter().map(|r| r.database_hits as f64), total),
        },
    };

    AnalyticsSummary {
        period_days,
        metrics,
        top_queries: top_queries(records),
        content_type_distribution: content_type_distribution(records),
    }
}

/// Most searched normalized queries. Equal counts keep first-seen order.
fn top_queries(records: &[AnalyticsRecord]) -> Vec<TopQuery> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&AnalyticsRecord>> = HashMap::new();
    for record in records {
        let key = record.normalized_query.as_str();
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(record);
    }

    let mut top: Vec<TopQuery> = order
        .into_iter()
        .map(|key| {
            let group = &groups[key];
            TopQuery {
                normalized_query: key.to_string(),
                search_count: group.len(),
                avg_results: mean(group.iter().map(|r| r.results_count as f64), group.len()),
                avg_time_ms: mean(group.iter().map(|r| r.search_time_ms as f64), group.len()),
            }
        })
        .collect();
    top.sort_by(|a, b| b.search_count.cmp(&a.search_count));
    top.truncate(TOP_QUERY_COUNT);
    top
}

fn content_type_distribution(records: &[AnalyticsRecord]) -> Vec<ContentTypeCount> {
    let mut counts: Vec<ContentTypeCount> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|c| c.content_type == record.content_type) {
            Some(count) => count.search_count += 1,
            None => counts.push(ContentTypeCount {
                content_type: record.content_type,
                search_count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.search_count.cmp(&a.search_count));
    counts
}
