//! Validation and cleanup of raw search requests

use crate::clock::Clock;
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::{
    ContentType, SearchFilter, SearchQuery, SearchRequest, SortBy, DEFAULT_LIMIT, MAX_LIMIT,
};
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;
use std::sync::Arc;

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_QUERY_CHARS: usize = 200;

const STEM_SUFFIXES: [&str; 6] = ["ing", "ed", "s", "er", "est", "ly"];

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"));

/// Remove `<...>` tags
pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}

/// Lowercase, trim and collapse runs of whitespace to a single space
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized text with one common suffix stripped from each word,
/// so "searching" and "searched" group together in analytics
pub fn analytics_key(text: &str) -> String {
    let stemmed = normalize_text(text)
        .split(' ')
        .map(stem_word)
        .collect::<Vec<_>>()
        .join(" ");
    stemmed.chars().take(MAX_QUERY_CHARS).collect()
}

fn stem_word(word: &str) -> &str {
    let length = word.chars().count();
    for suffix in STEM_SUFFIXES {
        if word.ends_with(suffix) && length > suffix.len() + 2 {
            return &word[..word.len() - suffix.len()];
        }
    }
    word
}

/// Turns a [`SearchRequest`] into a validated [`SearchQuery`]
#[derive(Clone)]
pub struct QueryNormalizer {
    clock: Arc<dyn Clock>,
}

impl QueryNormalizer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn normalize(&self, request: &SearchRequest) -> SearchResult<SearchQuery> {
        let raw = request
            .query
            .clone()
            .ok_or_else(|| SearchError::InvalidQuery("Query parameter is required".to_string()))?;

        let text = strip_markup(&raw).trim().to_string();
        let length = text.chars().count();
        if length < MIN_QUERY_CHARS {
            return Err(SearchError::InvalidQuery(format!(
                "Query must be at least {} characters",
                MIN_QUERY_CHARS
            )));
        }
        if length > MAX_QUERY_CHARS {
            return Err(SearchError::InvalidQuery(format!(
                "Query must be at most {} characters",
                MAX_QUERY_CHARS
            )));
        }

        let content_type = parse_option::<ContentType>("content_type", request.content_type.as_deref())?;
        let sort_by = parse_option::<SortBy>("sort_by", request.sort_by.as_deref())?;
        let filters = self.normalize_filters(request)?;

        let limit = request
            .limit
            .map(|limit| limit.clamp(1, MAX_LIMIT as i64) as usize)
            .unwrap_or(DEFAULT_LIMIT);
        let offset = request.offset.map(|offset| offset.max(0) as usize).unwrap_or(0);

        Ok(SearchQuery {
            normalized: normalize_text(&text),
            analytics_key: analytics_key(&text),
            raw,
            text,
            content_type,
            sort_by,
            filters,
            limit,
            offset,
            highlight: request.highlight.unwrap_or(false),
        })
    }

    fn normalize_filters(&self, request: &SearchRequest) -> SearchResult<SearchFilter> {
        let date_from = parse_date("date_from", request.date_from.as_deref())?;
        let date_to = parse_date("date_to", request.date_to.as_deref())?;

        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(SearchError::InvalidQuery(
                    "date_from must not be after date_to".to_string(),
                ));
            }
        }

        let today = self.clock.now().date_naive();
        for (name, date) in [("date_from", date_from), ("date_to", date_to)] {
            if matches!(date, Some(date) if date > today) {
                return Err(SearchError::InvalidQuery(format!("{} is in the future", name)));
            }
        }

        Ok(SearchFilter {
            date_from,
            date_to,
            author: non_blank(request.author.as_deref()),
            category: non_blank(request.category.as_deref()),
        })
    }
}

/// Parse an optional enum parameter; absent or blank means the default
pub fn parse_option<T>(name: &str, value: Option<&str>) -> SearchResult<T>
where
    T: FromStr + Default,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(T::default()),
        Some(value) => T::from_str(value)
            .map_err(|_| SearchError::UnsupportedOption(format!("Unsupported {}: {}", name, value))),
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp
fn parse_date(name: &str, value: Option<&str>) -> SearchResult<Option<NaiveDate>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map(Some)
        .map_err(|_| SearchError::InvalidQuery(format!("Invalid {} format (use ISO format)", name)))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
