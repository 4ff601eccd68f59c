//! # Signal K Protocol
//!
//! Pure, stateless pieces of the Signal K wire protocol:
//!
//! - **paths**: data-tree path flattening and REST resource addressing
//! - **messages**: subscribe/put framing and delta decoding

pub mod messages;
pub mod paths;

pub use messages::{DeltaMessage, DeltaUpdate, PathValue, PutMessage, SubscribeMessage, UpdateEnvelope};
pub use paths::{flatten, stream_url, to_resource_path, unwrap_value};
