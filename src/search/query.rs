//! Search request and normalized query types

use crate::models::ResultType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use strum::{Display, EnumString};
use validator::Validate;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// Which entity types a search covers
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentType {
    #[default]
    All,
    Posts,
    Threads,
    Users,
    Categories,
}

impl ContentType {
    /// Result types searched for this content type, in merge order
    pub fn result_types(&self) -> &'static [ResultType] {
        match self {
            ContentType::All => &[
                ResultType::Post,
                ResultType::Thread,
                ResultType::User,
                ResultType::Category,
                ResultType::Subcategory,
            ],
            ContentType::Posts => &[ResultType::Post],
            ContentType::Threads => &[ResultType::Thread],
            ContentType::Users => &[ResultType::User],
            ContentType::Categories => &[ResultType::Category, ResultType::Subcategory],
        }
    }

    /// Whether a result of `result_type` was specifically asked for
    pub fn targets(&self, result_type: ResultType) -> bool {
        *self != ContentType::All && self.result_types().contains(&result_type)
    }
}

/// Result ordering
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortBy {
    #[default]
    Relevance,
    DateDesc,
    DateAsc,
    Author,
}

/// Validated search filters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilter {
    /// Inclusive lower bound on the creation day
    pub date_from: Option<NaiveDate>,

    /// Inclusive upper bound on the creation day
    pub date_to: Option<NaiveDate>,

    /// Case-insensitive fragment of the author's display name or email
    pub author: Option<String>,

    /// Category slug
    pub category: Option<String>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.author.is_none()
            && self.category.is_none()
    }

    /// Names of the filters that are set, for analytics
    pub fn used(&self) -> BTreeMap<String, String> {
        let mut used = BTreeMap::new();
        if let Some(author) = &self.author {
            used.insert("author".to_string(), author.clone());
        }
        if let Some(category) = &self.category {
            used.insert("category".to_string(), category.clone());
        }
        if let Some(date_from) = self.date_from {
            used.insert("date_from".to_string(), date_from.to_string());
        }
        if let Some(date_to) = self.date_to {
            used.insert("date_to".to_string(), date_to.to_string());
        }
        used
    }
}

/// Raw search parameters as received over HTTP
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(max = 2000))]
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    #[validate(length(max = 150))]
    pub author: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    pub highlight: Option<bool>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_date_range(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.date_from = from.map(str::to_string);
        self.date_to = to.map(str::to_string);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = Some(highlight);
        self
    }
}

/// A validated, normalized search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    /// Query as received, before markup stripping
    pub raw: String,

    /// Markup-free, trimmed query
    pub text: String,

    /// Lowercased text with whitespace collapsed; drives matching and ranking
    pub normalized: String,

    /// Stemmed form used to group queries in analytics
    pub analytics_key: String,

    pub content_type: ContentType,
    pub sort_by: SortBy,
    pub filters: SearchFilter,
    pub limit: usize,
    pub offset: usize,
    pub highlight: bool,
}

impl SearchQuery {
    /// Whitespace-separated terms of the normalized query
    pub fn terms(&self) -> Vec<String> {
        self.normalized
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Cache key for this search
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.normalized, self.content_type, self.sort_by, &self.filters)
    }
}

fn update_field(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}

/// SHA-256 over the normalized query, content type, sort order and the
/// filters sorted by key. Every field is length-prefixed so free text can
/// never mimic a separator. Pagination is not part of the key.
pub fn fingerprint(
    normalized: &str,
    content_type: ContentType,
    sort_by: SortBy,
    filters: &SearchFilter,
) -> String {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, normalized);
    update_field(&mut hasher, &content_type.to_string());
    update_field(&mut hasher, &sort_by.to_string());
    for (key, value) in filters.used() {
        update_field(&mut hasher, &key);
        update_field(&mut hasher, &value);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_enum_parsing() {
        assert_eq!(ContentType::from_str("threads").unwrap(), ContentType::Threads);
        assert_eq!(SortBy::from_str("date_desc").unwrap(), SortBy::DateDesc);
        assert!(ContentType::from_str("forums").is_err());
        assert!(SortBy::from_str("popularity").is_err());
        assert_eq!(SortBy::DateAsc.to_string(), "date_asc");
    }

    #[test]
    fn test_content_type_targets() {
        assert!(ContentType::Categories.targets(ResultType::Subcategory));
        assert!(ContentType::Posts.targets(ResultType::Post));
        assert!(!ContentType::Posts.targets(ResultType::Thread));
        assert!(!ContentType::All.targets(ResultType::Thread));
        assert_eq!(ContentType::All.result_types().len(), 5);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let filters = SearchFilter {
            author: Some("jane".into()),
            ..Default::default()
        };
        let a = fingerprint("python", ContentType::All, SortBy::Relevance, &filters);
        let b = fingerprint("python", ContentType::All, SortBy::Relevance, &filters.clone());
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_sensitive_to_each_input() {
        let base = fingerprint("python", ContentType::All, SortBy::Relevance, &SearchFilter::default());

        assert_ne!(base, fingerprint("rust", ContentType::All, SortBy::Relevance, &SearchFilter::default()));
        assert_ne!(base, fingerprint("python", ContentType::Posts, SortBy::Relevance, &SearchFilter::default()));
        assert_ne!(base, fingerprint("python", ContentType::All, SortBy::Author, &SearchFilter::default()));

        let filtered = SearchFilter {
            category: Some("gardening".into()),
            ..Default::default()
        };
        assert_ne!(base, fingerprint("python", ContentType::All, SortBy::Relevance, &filtered));
    }

    #[test]
    fn test_fingerprint_filter_text_cannot_mimic_other_filters() {
        let smuggled = SearchFilter {
            author: Some("jane|date_to=2024-01-01".into()),
            ..Default::default()
        };
        let separate = SearchFilter {
            author: Some("jane".into()),
            date_to: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert_ne!(
            fingerprint("python", ContentType::All, SortBy::Relevance, &smuggled),
            fingerprint("python", ContentType::All, SortBy::Relevance, &separate)
        );

        let author = SearchFilter {
            author: Some("jane".into()),
            ..Default::default()
        };
        assert_ne!(
            fingerprint("python|all|relevance|author=jane", ContentType::All, SortBy::Relevance, &SearchFilter::default()),
            fingerprint("python", ContentType::All, SortBy::Relevance, &author)
        );
    }

    #[test]
    fn test_filters_used_sorted_by_key() {
        let filters = SearchFilter {
            date_to: NaiveDate::from_ymd_opt(2024, 3, 1),
            author: Some("jane".into()),
            ..Default::default()
        };
        let keys: Vec<String> = filters.used().into_keys().collect();
        assert_eq!(keys, vec!["author", "date_to"]);
        assert!(!filters.is_empty());
        assert!(SearchFilter::default().is_empty());
    }
}
