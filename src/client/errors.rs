//! # Client Errors

use thiserror::Error;

use crate::fetch::FetchError;
use crate::stream::StreamError;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Client-level errors, composed from the channel they arose on
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
