//! # Fetch Errors

use thiserror::Error;

/// Result type for document-fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Document-fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-success response status
    #[error("Fetch failed with status {0}")]
    Status(reqwest::StatusCode),

    /// Transport-level failure
    #[error("Fetch transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not valid JSON
    #[error("Fetch response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
