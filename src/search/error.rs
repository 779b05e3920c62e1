//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Query text or filters failed validation
    #[error("{0}")]
    InvalidQuery(String),

    /// Unknown content type, sort order or category
    #[error("{0}")]
    UnsupportedOption(String),

    /// Repository or matching backend failed
    #[error("Search execution failed: {0}")]
    BackendExecutionFailure(String),

    /// Per-type searches did not finish within the deadline
    #[error("Search exceeded deadline of {0}ms")]
    Timeout(u64),

    /// Index initialization failed
    #[error("Index initialization failed: {0}")]
    IndexInitFailed(String),

    /// Tantivy error
    #[error("Tantivy error: {0}")]
    TantivyError(String),
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(err: tantivy::TantivyError) -> Self {
        SearchError::TantivyError(err.to_string())
    }
}

impl From<AppError> for SearchError {
    fn from(err: AppError) -> Self {
        SearchError::BackendExecutionFailure(err.to_string())
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidQuery(msg) => AppError::InvalidQuery(msg),
            SearchError::UnsupportedOption(msg) => AppError::UnsupportedOption(msg),
            SearchError::Timeout(_) => AppError::Timeout(err.to_string()),
            _ => AppError::SearchFailed(err.to_string()),
        }
    }
}
