//! Search analytics
//!
//! Every completed search, cache hits included, becomes one
//! [`AnalyticsRecord`]. Recording sits behind an error boundary: a failed or
//! slow write is logged and never reaches the caller. Click reports update
//! the record of the search they follow, and [`AnalyticsRecorder::summary`]
//! aggregates a reporting period for the analytics endpoint.
//!
//! [`advise`] is independent of storage and turns the figures of one search
//! into performance diagnostics.

mod advisor;
mod config;
mod error;
mod models;
mod recorder;
mod store;
mod summary;

pub use advisor::{advise, Advisory, AdvisoryKind, AdvisoryLevel};
pub use config::{AnalyticsConfig, AnalyticsConfigBuilder};
pub use error::{AnalyticsError, AnalyticsResult};
pub use models::{anonymize_ip, AnalyticsRecord, ClickFeedback, RequestContext, SearchEvent};
pub use recorder::AnalyticsRecorder;
pub use store::{AnalyticsStore, InMemoryAnalyticsStore};
pub use summary::{
    summarize, AnalyticsSummary, ContentTypeCount, PerformanceSummary, SummaryMetrics, TopQuery,
    DEFAULT_PERIOD_DAYS, MAX_PERIOD_DAYS,
};
