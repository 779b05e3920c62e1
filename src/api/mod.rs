pub mod context;
pub mod handlers;
pub mod routes;

pub use context::{ensure_session, RequestMeta, RequireUser, SESSION_HEADER, USER_HEADER};
pub use routes::*;

use crate::history::SavedSearches;
use crate::search::{SearchService, SuggestionProvider};
use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub suggestions: Arc<SuggestionProvider>,
    pub saved: Arc<SavedSearches>,
    pub registry: Arc<Registry>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        search: Arc<SearchService>,
        suggestions: Arc<SuggestionProvider>,
        saved: Arc<SavedSearches>,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            search,
            suggestions,
            saved,
            registry,
            started_at: Instant::now(),
        }
    }
}
