//! Typed autocomplete suggestions

use crate::error::Result;
use crate::models::ResultType;
use crate::search::document::truncate_with_ellipsis;
use crate::state::ForumStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_SUGGESTIONS: usize = 10;
pub const MAX_SUGGESTIONS: usize = 20;
const MIN_PREFIX_CHARS: usize = 2;
const CATEGORY_DESCRIPTION_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub suggestion_type: ResultType,
    pub text: String,
    pub description: String,
    pub url: String,
    pub metadata: serde_json::Value,
}

pub struct SuggestionProvider {
    store: Arc<dyn ForumStore>,
}

impl SuggestionProvider {
    pub fn new(store: Arc<dyn ForumStore>) -> Self {
        Self { store }
    }

    /// Clamp a requested suggestion count to `1..=20`, defaulting to 10
    pub fn clamp_limit(limit: Option<i64>) -> usize {
        limit
            .map(|l| l.clamp(1, MAX_SUGGESTIONS as i64) as usize)
            .unwrap_or(DEFAULT_SUGGESTIONS)
    }

    /// Threads first, then users, then categories, at most `limit` in total
    pub async fn suggest(&self, q: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let q = q.trim();
        if q.chars().count() < MIN_PREFIX_CHARS {
            return Ok(Vec::new());
        }
        let needle = q.to_lowercase();
        let limit = limit.clamp(1, MAX_SUGGESTIONS);

        let mut suggestions = self.threads(&needle, (limit / 2).max(1)).await?;
        suggestions.extend(self.users(&needle, (limit / 4).max(1)).await?);
        suggestions.extend(self.categories(&needle, (limit / 4).max(1)).await?);
        suggestions.truncate(limit);

        tracing::debug!(query = q, count = suggestions.len(), "Built search suggestions");
        Ok(suggestions)
    }

    async fn threads(&self, needle: &str, take: usize) -> Result<Vec<Suggestion>> {
        let mut threads: Vec<_> = self
            .store
            .list_threads()
            .await?
            .into_iter()
            .filter(|t| t.title.to_lowercase().contains(needle))
            .collect();
        threads.sort_by(|a, b| b.view_count.cmp(&a.view_count));

        let subcategories: HashMap<u64, _> = self
            .store
            .list_subcategories()
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let categories: HashMap<u64, _> = self
            .store
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut suggestions = Vec::with_capacity(take);
        for thread in threads {
            if suggestions.len() == take {
                break;
            }
            let Some(subcategory) = subcategories.get(&thread.subcategory_id) else {
                continue;
            };
            let Some(category) = categories.get(&subcategory.category_id) else {
                continue;
            };
            suggestions.push(Suggestion {
                suggestion_type: ResultType::Thread,
                description: format!("in {} / {}", category.name, subcategory.name),
                url: format!("/forums/{}/{}/{}/", category.slug, subcategory.slug, thread.slug),
                metadata: json!({
                    "post_count": thread.post_count,
                    "view_count": thread.view_count,
                }),
                text: thread.title,
            });
        }
        Ok(suggestions)
    }

    async fn users(&self, needle: &str, take: usize) -> Result<Vec<Suggestion>> {
        Ok(self
            .store
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.is_active && u.display_name.to_lowercase().contains(needle))
            .take(take)
            .map(|user| {
                let location = if user.location.is_empty() {
                    "Location unknown"
                } else {
                    user.location.as_str()
                };
                Suggestion {
                    suggestion_type: ResultType::User,
                    description: format!("User • {}", location),
                    url: format!("/accounts/user/{}/", user.id),
                    metadata: json!({ "join_date": user.date_joined.to_rfc3339() }),
                    text: user.display_name.clone(),
                }
            })
            .collect())
    }

    async fn categories(&self, needle: &str, take: usize) -> Result<Vec<Suggestion>> {
        let subcategories = self.store.list_subcategories().await?;
        Ok(self
            .store
            .list_categories()
            .await?
            .into_iter()
            .filter(|c| c.name.to_lowercase().contains(needle))
            .take(take)
            .map(|category| {
                let description = if category.description.is_empty() {
                    "Category".to_string()
                } else {
                    format!(
                        "Category • {}",
                        truncate_with_ellipsis(&category.description, CATEGORY_DESCRIPTION_CHARS)
                    )
                };
                let subcategory_count = subcategories
                    .iter()
                    .filter(|s| s.category_id == category.id)
                    .count();
                Suggestion {
                    suggestion_type: ResultType::Category,
                    description,
                    url: format!("/forums/{}/", category.slug),
                    metadata: json!({ "subcategory_count": subcategory_count }),
                    text: category.name,
                }
            })
            .collect())
    }
}
