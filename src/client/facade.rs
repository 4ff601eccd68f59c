//! # Signal K Client
//!
//! Composes the streaming and fetch channels into the single object
//! applications hold: subscription registration, single-shot reads, put
//! requests and connection readiness.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use super::errors::ClientResult;
use crate::fetch::ValueFetcher;
use crate::protocol::messages::PutMessage;
use crate::stream::connection::{Connection, ConnectionState};
use crate::stream::consumer::{ConsumerEntry, DeliveryShape, DeliveryTarget, TextSink, UpdateFilter};
use crate::stream::dispatcher::DeltaDispatcher;
use crate::stream::errors::StreamError;
use crate::stream::subscription::SubscriptionRegistry;

/// A client for one Signal K server.
///
/// One streaming connection per instance, made once at construction; there
/// is no reconnection and no teardown operation. Registry and connection
/// live exactly as long as the client.
pub struct SignalkClient {
    host: String,
    port: u16,
    connection: Connection,
    registry: Arc<SubscriptionRegistry>,
    outbound: mpsc::UnboundedSender<String>,
    fetcher: ValueFetcher,
}

impl SignalkClient {
    /// Open a client against `host:port`.
    ///
    /// Must run inside a tokio runtime; the connection attempt proceeds in
    /// the background while the client is usable immediately. An invalid
    /// host specification fails here, before any connection attempt.
    pub fn open(host: &str, port: u16) -> ClientResult<Self> {
        debug!(host, port, "constructing client");

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let registry = Arc::new(SubscriptionRegistry::new(outbound_tx.clone(), state_rx));
        let dispatcher = Arc::new(DeltaDispatcher::new(Arc::clone(&registry)));
        let connection = Connection::open(host, port, state_tx, dispatcher, outbound_rx)?;

        Ok(Self {
            host: host.to_string(),
            port,
            connection,
            registry,
            outbound: outbound_tx,
            fetcher: ValueFetcher::new(host, port),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the streaming connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_open()
    }

    /// Suspend until the streaming connection is open. No internal timeout;
    /// see [`Connection::wait_until_open`].
    pub async fn wait_until_open(&self) {
        self.connection.wait_until_open().await;
    }

    /// Register a consumer for delta updates on `path`: bare values, default
    /// unwrap, no filter.
    pub fn subscribe(&self, path: &str, target: DeliveryTarget) -> ClientResult<()> {
        self.register(path, target, None, DeliveryShape::Bare)
    }

    /// Register a consumer with an explicit filter and delivery shape.
    pub fn register(
        &self,
        path: &str,
        target: DeliveryTarget,
        filter: Option<UpdateFilter>,
        shape: DeliveryShape,
    ) -> ClientResult<()> {
        self.registry
            .register(path, ConsumerEntry::new(target, filter, shape))?;
        Ok(())
    }

    /// Route updates for `path` into a text sink.
    pub fn subscribe_text(
        &self,
        path: &str,
        sink: Arc<dyn TextSink>,
        filter: Option<UpdateFilter>,
    ) -> ClientResult<()> {
        self.register(path, DeliveryTarget::text_sink(sink), filter, DeliveryShape::Bare)
    }

    /// Read the current value of `path`; `None` when the fetch fails.
    pub async fn get_value(
        &self,
        path: &str,
        filter: Option<&UpdateFilter>,
    ) -> ClientResult<Option<Value>> {
        Ok(self.fetcher.fetch(path, filter).await?)
    }

    /// Read the current value of `path` and route it through a delivery
    /// target.
    pub async fn get_value_into(
        &self,
        path: &str,
        target: &DeliveryTarget,
        filter: Option<&UpdateFilter>,
    ) -> ClientResult<()> {
        Ok(self.fetcher.fetch_into(path, target, filter).await?)
    }

    /// Read the current value of `path` into a text sink.
    pub async fn get_value_text(&self, path: &str, sink: Arc<dyn TextSink>) -> ClientResult<()> {
        self.get_value_into(path, &DeliveryTarget::text_sink(sink), None)
            .await
    }

    /// Every leaf path the server currently exposes.
    pub async fn endpoints(&self) -> ClientResult<Vec<String>> {
        Ok(self.fetcher.fetch_tree().await?)
    }

    /// Request that `path` be set to `value`; returns the generated
    /// correlation id.
    pub fn put_value(&self, path: &str, value: Value) -> ClientResult<String> {
        self.put_value_with_id(path, value, None)
    }

    /// Put with a caller-supplied correlation id.
    ///
    /// Any JSON value is legal, including `null`, `false` and `0`; only the
    /// path must be non-empty. No acknowledgement is awaited here, the id
    /// is for the caller to correlate any response.
    pub fn put_value_with_id(
        &self,
        path: &str,
        value: Value,
        request_id: Option<String>,
    ) -> ClientResult<String> {
        if path.is_empty() {
            return Err(StreamError::InvalidArgument(
                "put path must not be empty".to_string(),
            )
            .into());
        }
        if self.connection.state().is_terminal() {
            return Err(StreamError::NotConnected.into());
        }

        let message = PutMessage::new(path, value, request_id);
        let frame = message
            .to_frame()
            .map_err(|e| StreamError::Internal(e.to_string()))?;
        self.outbound
            .send(frame)
            .map_err(|_| StreamError::NotConnected)?;
        Ok(message.request_id().to_string())
    }
}
