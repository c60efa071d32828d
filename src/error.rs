//! Custom error types for pubmed-papers.
//!
//! Every fallible library function returns `Result<T, FetcherError>` instead of panicking.
//! Callers decide which failures degrade silently and which surface to the user.

use thiserror::Error;

/// Main error type for pubmed-papers operations.
#[derive(Debug, Error)]
pub enum FetcherError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// E-utilities returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: i32,
        /// Error message
        message: String,
    },

    /// Response body could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// EFetch XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ESearch JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// An article record lacks data required to build a report row
    #[error("Malformed article: {0}")]
    MalformedArticle(String),
}

/// Result type alias using `FetcherError`
pub type Result<T> = std::result::Result<T, FetcherError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| FetcherError::Parse(msg.to_string()))
    }
}
