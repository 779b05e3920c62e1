//! Performance diagnostics for a single search

use serde::{Deserialize, Serialize};
use strum::Display;

pub const SLOW_SEARCH_MS: u64 = 1000;
pub const MANY_DATABASE_HITS: u32 = 10;
pub const MANY_RESULTS: usize = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdvisoryKind {
    Performance,
    Database,
    Results,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdvisoryLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advisory {
    #[serde(rename = "type")]
    pub kind: AdvisoryKind,
    pub level: AdvisoryLevel,
    pub message: String,
}

/// Suggestions for a search with these figures, in a fixed order
pub fn advise(search_time_ms: u64, results_count: usize, database_hits: u32) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if search_time_ms > SLOW_SEARCH_MS {
        advisories.push(Advisory {
            kind: AdvisoryKind::Performance,
            level: AdvisoryLevel::Warning,
            message: format!("Search took {}ms - consider optimization", search_time_ms),
        });
    }

    if database_hits > MANY_DATABASE_HITS {
        advisories.push(Advisory {
            kind: AdvisoryKind::Database,
            level: AdvisoryLevel::Info,
            message: format!("{} database queries - may benefit from caching", database_hits),
        });
    }

    if results_count == 0 {
        advisories.push(Advisory {
            kind: AdvisoryKind::Results,
            level: AdvisoryLevel::Warning,
            message: "No results found - consider query expansion or fuzzy matching".to_string(),
        });
    } else if results_count > MANY_RESULTS {
        advisories.push(Advisory {
            kind: AdvisoryKind::Results,
            level: AdvisoryLevel::Info,
            message: format!("{} results - consider more specific filtering", results_count),
        });
    }

    advisories
}
