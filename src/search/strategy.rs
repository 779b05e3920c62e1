//! Matching backends behind the search executor

use crate::models::ResultType;
use crate::search::document::{category_text, post_text, subcategory_text, thread_text, user_text};
use crate::search::error::SearchResult;
use crate::state::ForumStore;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// How a strategy matches and scores text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendCapability {
    NativeFullText,
    PortableSubstring,
}

/// One matched entity and its raw backend rank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMatch {
    pub id: u64,
    pub rank: f64,
}

/// Per-entity-type text matching. A match needs only one of `terms`.
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    fn capability(&self) -> BackendCapability;

    async fn text_search(&self, kind: ResultType, terms: &[String]) -> SearchResult<Vec<TextMatch>>;
}

/// Case-insensitive substring matching straight over the repository
pub struct PortableSubstringStrategy {
    store: Arc<dyn ForumStore>,
}

impl PortableSubstringStrategy {
    pub const RANK: f64 = 1.0;

    pub fn new(store: Arc<dyn ForumStore>) -> Self {
        Self { store }
    }

    fn collect<'a, I>(&self, candidates: I, terms: &[String]) -> Vec<TextMatch>
    where
        I: Iterator<Item = (u64, Vec<&'a str>)>,
    {
        candidates
            .filter(|(_, fields)| matches_any(fields, terms))
            .map(|(id, _)| TextMatch {
                id,
                rank: Self::RANK,
            })
            .collect()
    }
}

/// True when any term occurs, ignoring case, in any field
pub fn matches_any(fields: &[&str], terms: &[String]) -> bool {
    fields.iter().any(|field| {
        let field = field.to_lowercase();
        terms
            .iter()
            .any(|term| !term.is_empty() && field.contains(&term.to_lowercase()))
    })
}

#[async_trait]
impl SearchStrategy for PortableSubstringStrategy {
    fn capability(&self) -> BackendCapability {
        BackendCapability::PortableSubstring
    }

    async fn text_search(&self, kind: ResultType, terms: &[String]) -> SearchResult<Vec<TextMatch>> {
        let matches = match kind {
            ResultType::Post => {
                let posts = self.store.list_posts().await?;
                self.collect(posts.iter().map(|p| (p.id, post_text(p))), terms)
            }
            ResultType::Thread => {
                let threads = self.store.list_threads().await?;
                self.collect(threads.iter().map(|t| (t.id, thread_text(t))), terms)
            }
            ResultType::User => {
                let users = self.store.list_users().await?;
                self.collect(
                    users
                        .iter()
                        .filter(|u| u.is_active)
                        .map(|u| (u.id, user_text(u))),
                    terms,
                )
            }
            ResultType::Category => {
                let categories = self.store.list_categories().await?;
                self.collect(categories.iter().map(|c| (c.id, category_text(c))), terms)
            }
            ResultType::Subcategory => {
                let subcategories = self.store.list_subcategories().await?;
                self.collect(
                    subcategories.iter().map(|s| (s.id, subcategory_text(s))),
                    terms,
                )
            }
        };

        tracing::trace!(kind = %kind, matches = matches.len(), "Substring search finished");
        Ok(matches)
    }
}
