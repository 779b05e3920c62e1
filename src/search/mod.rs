//! Unified forum search
//!
//! One query runs against posts, threads, users, categories and
//! subcategories, and the merged results are ranked together:
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 SearchService                    │
//! │  normalize → cache lookup → execute → aggregate  │
//! │  → rank / sort → cache store → analytics         │
//! └──────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────────┐
//! │                 SearchExecutor                   │
//! │  per-type searches, concurrent, under a deadline │
//! └──────────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌───────────────────────┐  ┌───────────────────────┐
//! │ NativeFullTextStrategy│  │PortableSubstring-     │
//! │ (Tantivy, BM25 rank)  │  │Strategy (rank 1.0)    │
//! └───────────────────────┘  └───────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use forum_search::analytics::RequestContext;
//! use forum_search::search::{build_strategy, SearchConfig, SearchRequest, SearchService};
//! use forum_search::state::InMemoryForumStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryForumStore::new());
//!     let strategy = build_strategy(store.clone(), &SearchConfig::default()).await?;
//!     let search = SearchService::builder(store, strategy).build();
//!
//!     let request = SearchRequest::new("python").with_content_type("threads");
//!     let response = search.search(&request, RequestContext::default()).await?;
//!     println!("Found {} results", response.total_results);
//!
//!     Ok(())
//! }
//! ```

mod aggregator;
mod cache;
mod config;
mod document;
mod error;
mod executor;
mod highlight;
mod index;
mod normalizer;
mod query;
mod ranking;
mod service;
mod strategy;
mod suggest;

pub use aggregator::aggregate;
pub use cache::SearchCache;
pub use config::{BackendKind, CacheConfig, SearchConfig, SearchConfigBuilder};
pub use document::truncate_with_ellipsis;
pub use error::{SearchError, SearchResult};
pub use executor::{ExecutionOutcome, SearchExecutor};
pub use highlight::{escape_html, highlight_terms, snippet};
pub use index::{IndexStats, NativeFullTextStrategy};
pub use normalizer::{analytics_key, normalize_text, parse_option, strip_markup, QueryNormalizer};
pub use query::{fingerprint, ContentType, SearchFilter, SearchQuery, SearchRequest, SortBy};
pub use ranking::{explain, score, RankingEngine};
pub use service::{
    build_strategy, AuthorView, HighlightView, Pagination, SearchHit, SearchResponse, SearchService,
    SearchServiceBuilder,
};
pub use strategy::{matches_any, BackendCapability, PortableSubstringStrategy, SearchStrategy, TextMatch};
pub use suggest::{Suggestion, SuggestionProvider, DEFAULT_SUGGESTIONS, MAX_SUGGESTIONS};
