//! Error types for analytics operations

use crate::error::AppError;
use uuid::Uuid;

/// Result type for analytics operations
pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur in analytics operations
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// No search event with this id was recorded
    #[error("Search record not found: {0}")]
    RecordNotFound(Uuid),

    /// Reporting period outside 1..=365 days
    #[error("Invalid period: {0} days (expected 1 to 365)")]
    InvalidPeriod(i64),

    /// Store write or read failed
    #[error("Analytics store error: {0}")]
    StoreFailure(String),

    /// Recording did not finish in time
    #[error("Analytics recording exceeded {0}ms")]
    Timeout(u64),
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::RecordNotFound(_) => AppError::NotFound(err.to_string()),
            AnalyticsError::InvalidPeriod(_) => AppError::Validation(err.to_string()),
            AnalyticsError::Timeout(_) => AppError::Timeout(err.to_string()),
            AnalyticsError::StoreFailure(msg) => AppError::Internal(msg),
        }
    }
}
