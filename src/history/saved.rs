//! Named search presets

use crate::clock::Clock;
use crate::error::{AppError, Result};
use crate::search::{parse_option, ContentType, SortBy};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub const MAX_NAME_CHARS: usize = 100;
const SEARCH_PATH: &str = "/api/search";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SaveSearchRequest {
    #[validate(length(max = 100))]
    pub name: String,
    #[validate(length(max = 200))]
    pub query: String,
    pub content_type: Option<String>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedSearch {
    pub id: Uuid,
    pub user_id: u64,
    pub name: String,
    pub query: String,
    pub content_type: ContentType,
    pub sort_by: SortBy,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Search endpoint URL that replays this search
    pub url: String,
}

/// `/api/search?query=…&content_type=…&sort_by=…`, form-urlencoded
pub fn search_url(query: &str, content_type: ContentType, sort_by: SortBy) -> String {
    let base = format!("http://localhost{}", SEARCH_PATH);
    match Url::parse_with_params(
        &base,
        &[
            ("query", query.to_string()),
            ("content_type", content_type.to_string()),
            ("sort_by", sort_by.to_string()),
        ],
    ) {
        Ok(url) => format!("{}?{}", url.path(), url.query().unwrap_or_default()),
        Err(_) => SEARCH_PATH.to_string(),
    }
}

pub struct SavedSearches {
    entries: DashMap<u64, Vec<SavedSearch>>,
    clock: Arc<dyn Clock>,
}

impl SavedSearches {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn save(&self, user_id: u64, request: SaveSearchRequest) -> Result<SavedSearch> {
        request.validate()?;

        let name = request.name.trim().to_string();
        let query = request.query.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Saved search name is required".to_string()));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::Validation(format!(
                "Saved search name must be at most {} characters",
                MAX_NAME_CHARS
            )));
        }
        if query.is_empty() {
            return Err(AppError::Validation("Saved search query is required".to_string()));
        }
        let content_type = parse_option::<ContentType>("content_type", request.content_type.as_deref())?;
        let sort_by = parse_option::<SortBy>("sort_by", request.sort_by.as_deref())?;

        let mut saved = self.entries.entry(user_id).or_default();
        if saved.iter().any(|s| s.name == name) {
            return Err(AppError::Validation(format!(
                "A saved search named '{}' already exists",
                name
            )));
        }

        let now = self.clock.now();
        let search = SavedSearch {
            id: Uuid::new_v4(),
            user_id,
            url: search_url(&query, content_type, sort_by),
            name,
            query,
            content_type,
            sort_by,
            is_active: true,
            last_used_at: None,
            created_at: now,
            updated_at: now,
        };
        saved.push(search.clone());

        tracing::info!(user_id, saved_search_id = %search.id, "Saved search created");
        Ok(search)
    }

    /// Active saved searches, most recently used first, never-used last
    pub fn list(&self, user_id: u64) -> Vec<SavedSearch> {
        let Some(saved) = self.entries.get(&user_id) else {
            return Vec::new();
        };
        let mut list: Vec<SavedSearch> = saved.iter().filter(|s| s.is_active).cloned().collect();
        list.sort_by_key(|s| (Reverse(s.last_used_at), Reverse(s.updated_at)));
        list
    }

    pub fn delete(&self, user_id: u64, id: Uuid) -> Result<()> {
        let mut saved = self
            .entries
            .get_mut(&user_id)
            .ok_or_else(|| not_found(id))?;
        let before = saved.len();
        saved.retain(|s| s.id != id);
        if saved.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    pub fn mark_used(&self, user_id: u64, id: Uuid) -> Result<SavedSearch> {
        let mut saved = self
            .entries
            .get_mut(&user_id)
            .ok_or_else(|| not_found(id))?;
        let search = saved
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found(id))?;
        search.last_used_at = Some(self.clock.now());
        Ok(search.clone())
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Saved search {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Duration;

    fn request(name: &str, query: &str) -> SaveSearchRequest {
        SaveSearchRequest {
            name: name.into(),
            query: query.into(),
            ..Default::default()
        }
    }

    fn saved() -> (SavedSearches, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (SavedSearches::new(clock.clone()), clock)
    }

    #[test]
    fn test_search_url_is_form_encoded() {
        assert_eq!(
            search_url("rust & go", ContentType::Threads, SortBy::DateDesc),
            "/api/search?query=rust+%26+go&content_type=threads&sort_by=date_desc"
        );
    }

    #[test]
    fn test_save_validates() {
        let (saved, _) = saved();
        assert!(matches!(saved.save(1, request("  ", "rust")), Err(AppError::Validation(_))));
        assert!(matches!(saved.save(1, request("Rust", " ")), Err(AppError::Validation(_))));
        assert!(matches!(
            saved.save(1, request(&"n".repeat(101), "rust")),
            Err(AppError::Validation(_))
        ));

        let mut bad_sort = request("Rust", "rust");
        bad_sort.sort_by = Some("popularity".into());
        assert!(matches!(saved.save(1, bad_sort), Err(AppError::UnsupportedOption(_))));
    }

    #[test]
    fn test_names_unique_per_user() {
        let (saved, _) = saved();
        saved.save(1, request("Rust", "rust")).unwrap();
        assert!(matches!(saved.save(1, request("Rust", "cargo")), Err(AppError::Validation(_))));
        assert!(saved.save(2, request("Rust", "rust")).is_ok());
    }

    #[test]
    fn test_list_order() {
        let (saved, clock) = saved();
        let a = saved.save(1, request("a", "alpha")).unwrap();
        clock.advance(Duration::seconds(1));
        let b = saved.save(1, request("b", "beta")).unwrap();
        clock.advance(Duration::seconds(1));
        let c = saved.save(1, request("c", "gamma")).unwrap();

        clock.advance(Duration::seconds(1));
        saved.mark_used(1, a.id).unwrap();

        let ids: Vec<Uuid> = saved.list(1).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a.id, c.id, b.id]);
    }

    #[test]
    fn test_delete_scoped_to_owner() {
        let (saved, _) = saved();
        let search = saved.save(1, request("Rust", "rust")).unwrap();

        assert!(matches!(saved.delete(2, search.id), Err(AppError::NotFound(_))));
        saved.delete(1, search.id).unwrap();
        assert!(matches!(saved.delete(1, search.id), Err(AppError::NotFound(_))));
        assert!(saved.list(1).is_empty());
    }
}
