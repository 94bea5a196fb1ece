//! Custom error types for rustpubmed.
//!
//! This module defines all error types used throughout the library.
//! All fallible functions return `Result<T, PubmedError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for rustpubmed operations.
///
/// Missing optional fields in a record are never errors; they are rendered
/// as placeholders. Only whole-record failures end up here.
#[derive(Debug, Error)]
pub enum PubmedError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// XML or JSON document could not be read
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rate limited by E-utilities
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// E-utilities returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: i32,
        /// Error message
        message: String,
    },

    /// Record ID unknown to the source
    #[error("Record not found: {0}")]
    NotFound(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `PubmedError`
pub type Result<T> = std::result::Result<T, PubmedError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| PubmedError::Parse(msg.to_string()))
    }
}

impl From<quick_xml::Error> for PubmedError {
    fn from(e: quick_xml::Error) -> Self {
        PubmedError::Parse(format!("XML error: {}", e))
    }
}
