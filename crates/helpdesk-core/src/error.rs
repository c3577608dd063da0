//! Error types for the helpdesk core crate
//!
//! These cover fixture loading and snapshot construction. Search-time
//! validation errors live in `helpdesk-search-core`.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the helpdesk core crate
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Fixture Errors
    // ==========================================================================
    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),

    #[error("Record without id in collection '{0}'")]
    MissingId(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error type string (for JSON responses)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidFixture(_) => "INVALID_FIXTURE",
            Self::MissingId(_) => "MISSING_ID",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
