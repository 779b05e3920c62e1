//! Multi-factor relevance ranking.
//!
//! Every factor is a pure function of the record, the query and "now", so
//! ranking the same input twice gives the same order.

use crate::clock::Clock;
use crate::models::{ResultRecord, ResultType, ScoreBreakdown};
use crate::search::query::ContentType;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub const RELEVANCE_WEIGHT: f64 = 0.40;
pub const POPULARITY_WEIGHT: f64 = 0.25;
pub const FRESHNESS_WEIGHT: f64 = 0.15;
pub const TYPE_PRIORITY_WEIGHT: f64 = 0.10;
pub const QUALITY_WEIGHT: f64 = 0.10;

/// Multiplier on the type priority of records of the requested content type
pub const TYPE_BOOST: f64 = 1.5;

const QUALITY_FLOOR: f64 = -5.0;

/// Query match quality, title matches weighing most
pub fn relevance_score(record: &ResultRecord, query: &str) -> f64 {
    let query = query.to_lowercase();
    let title = record.title.to_lowercase();
    let content = match record.result_type {
        ResultType::Thread => title.clone(),
        _ => record.content.to_lowercase(),
    };

    let mut score = 0.0;
    for term in query.split_whitespace() {
        if title == term {
            score += 10.0;
        } else if title.starts_with(term) {
            score += 7.0;
        } else if title.contains(term) {
            score += 5.0;
        }

        let occurrences = content.matches(term).count();
        if occurrences > 0 {
            score += (occurrences as f64 * 2.0).min(8.0);
        }
    }

    if title.contains(&query) {
        score += 15.0;
    } else if content.contains(&query) {
        score += 8.0;
    }
    score
}

/// Engagement signals
pub fn popularity_score(record: &ResultRecord) -> f64 {
    let signals = &record.signals;
    match record.result_type {
        ResultType::Post => (signals.vote_count as f64 * 2.0).min(20.0),
        ResultType::Thread => {
            ((signals.view_count / 10) as f64).min(15.0) + (signals.post_count as f64 * 2.0).min(10.0)
        }
        ResultType::User => ((signals.post_count / 5) as f64).min(15.0),
        ResultType::Category | ResultType::Subcategory => 5.0,
    }
}

/// Bucketed age in whole days; undated records score 0
pub fn freshness_score(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(created_at) = created_at else {
        return 0.0;
    };
    match (now - created_at).num_days() {
        days if days <= 1 => 10.0,
        days if days <= 7 => 8.0,
        days if days <= 30 => 5.0,
        days if days <= 90 => 2.0,
        _ => 0.0,
    }
}

pub fn type_priority_score(result_type: ResultType, content_type: ContentType) -> f64 {
    let base = result_type.base_priority();
    if content_type.targets(result_type) {
        base * TYPE_BOOST
    } else {
        base
    }
}

/// Length-based quality, floored at -5
pub fn quality_score(record: &ResultRecord) -> f64 {
    let mut score: f64 = 0.0;

    match record.result_type {
        ResultType::Post => {
            let length = record.signals.body_length;
            if (50..=1000).contains(&length) {
                score += 5.0;
            } else if length > 1000 {
                score += 3.0;
            } else if length < 20 {
                score -= 2.0;
            }
        }
        ResultType::Thread => {
            let length = record.title.chars().count();
            if (10..=100).contains(&length) {
                score += 5.0;
            } else if length < 5 {
                score -= 3.0;
            }
        }
        _ => {}
    }

    if record.content.chars().count() < 10 {
        score -= 5.0;
    }
    score.max(QUALITY_FLOOR)
}

pub fn score(record: &ResultRecord, query: &str, content_type: ContentType, now: DateTime<Utc>) -> ScoreBreakdown {
    let relevance = relevance_score(record, query);
    let popularity = popularity_score(record);
    let freshness = freshness_score(record.created_at, now);
    let type_priority = type_priority_score(record.result_type, content_type);
    let quality = quality_score(record);

    ScoreBreakdown {
        relevance,
        popularity,
        freshness,
        type_priority,
        quality,
        total: relevance * RELEVANCE_WEIGHT
            + popularity * POPULARITY_WEIGHT
            + freshness * FRESHNESS_WEIGHT
            + type_priority * TYPE_PRIORITY_WEIGHT
            + quality * QUALITY_WEIGHT,
    }
}

/// Human-readable summary of why a record ranked where it did
pub fn explain(breakdown: &ScoreBreakdown) -> String {
    let mut reasons = Vec::new();

    if breakdown.relevance > 10.0 {
        reasons.push("High relevance match");
    } else if breakdown.relevance > 5.0 {
        reasons.push("Good relevance match");
    }

    if breakdown.popularity > 15.0 {
        reasons.push("Very popular content");
    } else if breakdown.popularity > 8.0 {
        reasons.push("Popular content");
    }

    if breakdown.freshness > 7.0 {
        reasons.push("Recent content");
    }

    if breakdown.quality > 3.0 {
        reasons.push("High quality content");
    } else if breakdown.quality < 0.0 {
        reasons.push("Short content");
    }

    if reasons.is_empty() {
        "Standard ranking".to_string()
    } else {
        reasons.join("; ")
    }
}

#[derive(Clone)]
pub struct RankingEngine {
    clock: Arc<dyn Clock>,
}

impl RankingEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Score every record and sort by total, highest first. Ties keep
    /// their incoming order.
    pub fn rank(&self, mut records: Vec<ResultRecord>, query: &str, content_type: ContentType) -> Vec<ResultRecord> {
        let now = self.clock.now();
        for record in records.iter_mut() {
            record.score = Some(score(record, query, content_type, now));
        }
        records.sort_by(|a, b| b.total_score().total_cmp(&a.total_score()));
        records
    }
}
