//! # Client Facade
//!
//! The object applications interact with, plus an explicit install-or-reuse
//! registry replacing the ambient global of older clients.

pub mod errors;
pub mod facade;
pub mod registry;

pub use errors::{ClientError, ClientResult};
pub use facade::SignalkClient;
pub use registry::ClientRegistry;
