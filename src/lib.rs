//! Unified search for the forum.
//!
//! One query fans out over posts, threads, users, categories and
//! subcategories, gets a multi-factor relevance ranking, is cached with an
//! adaptive expiry and leaves an analytics trail for later tuning.
//!
//! ```text
//! request -> QueryNormalizer -> SearchCache ─hit──────────────┐
//!                                   │miss                      │
//!                                   ▼                          ▼
//!            SearchExecutor (SearchStrategy per type) -> aggregate -> RankingEngine
//!                                                              │
//!                               AnalyticsRecorder <── response ┘
//! ```

pub mod analytics;
pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod models;
pub mod search;
pub mod state;

pub use error::{AppError, Result};
