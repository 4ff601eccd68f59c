//! # Streaming Channel
//!
//! The subscription/dispatch engine over the Signal K delta feed:
//!
//! - **consumer**: delivery targets, filters and consumer entries
//! - **subscription**: the path -> consumers registry
//! - **dispatcher**: fan-out of decoded delta messages
//! - **connection**: the websocket connection lifecycle

pub mod connection;
pub mod consumer;
pub mod dispatcher;
pub mod errors;
pub mod subscription;

pub use connection::{Connection, ConnectionState};
pub use consumer::{ConsumerEntry, DeliveryShape, DeliveryTarget, TextSink, Updatable, UpdateFilter};
pub use dispatcher::DeltaDispatcher;
pub use errors::{StreamError, StreamResult};
pub use subscription::SubscriptionRegistry;
