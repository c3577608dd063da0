//! Error types for the search engine
//!
//! Only argument validation can fail. Once a request is accepted, malformed
//! filter values and partially-populated records collapse to "no match".

use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Message returned when a page would start past the result window.
pub const RESULT_WINDOW_MESSAGE: &str = "422 Unprocessable Entity: Search results are limited to 1000 records. Please refine your search query to get fewer results.";

/// Errors raised while validating a search request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A parameter had the wrong primitive type
    #[error("{param} must be {expected}, got {got}")]
    InvalidType {
        param: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    /// A parameter had the right type but an unacceptable value
    #[error("{0}")]
    InvalidValue(String),
}

impl SearchError {
    /// Returns the error type string (for JSON responses)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidType { .. } => "TYPE_ERROR",
            Self::InvalidValue(_) => "VALUE_ERROR",
        }
    }

    pub(crate) fn result_window() -> Self {
        Self::InvalidValue(RESULT_WINDOW_MESSAGE.to_string())
    }
}
