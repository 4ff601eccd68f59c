//! # Document Fetch
//!
//! Pull-based access to the server data tree over HTTP.

pub mod errors;
pub mod fetcher;

pub use errors::{FetchError, FetchResult};
pub use fetcher::ValueFetcher;
