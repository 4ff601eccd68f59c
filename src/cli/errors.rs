//! CLI error types

use thiserror::Error;

use crate::client::ClientError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("No value available for {0}")]
    NoValue(String),

    #[error("Timed out waiting for the server connection")]
    ConnectTimeout,
}
