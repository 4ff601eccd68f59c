//! signalk-client - streaming delta subscriptions and REST access to a
//! Signal K vessel data tree

pub mod cli;
pub mod client;
pub mod fetch;
pub mod protocol;
pub mod stream;

pub use client::{ClientError, ClientRegistry, ClientResult, SignalkClient};
pub use fetch::{FetchError, ValueFetcher};
pub use stream::{
    ConnectionState, DeliveryShape, DeliveryTarget, StreamError, TextSink, Updatable, UpdateFilter,
};
