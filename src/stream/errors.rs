//! # Streaming Errors
//!
//! Error types for the streaming channel.

use thiserror::Error;

/// Result type for streaming operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Streaming channel errors
#[derive(Debug, Error)]
pub enum StreamError {
    /// Host or port missing/unparseable; fatal to the client instance
    #[error("Invalid host specification: {0}")]
    InvalidHostSpec(String),

    /// Missing or empty argument on register/put
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation requires a live connection and none exists
    #[error("Not connected")]
    NotConnected,

    /// Undecodable delta frame; isolated per message
    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
