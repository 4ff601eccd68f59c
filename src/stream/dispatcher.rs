//! # Delta Dispatcher
//!
//! Consumes decoded streaming frames one at a time and fans their updates
//! out through the subscription registry. No buffering, no reordering; a
//! frame that fails to decode is isolated and the loop moves on.

use std::sync::Arc;

use tracing::trace;

use super::errors::StreamResult;
use super::subscription::SubscriptionRegistry;
use crate::protocol::messages::{DeltaMessage, UpdateEnvelope};

/// Fan-out of delta messages to registered consumers.
pub struct DeltaDispatcher {
    registry: Arc<SubscriptionRegistry>,
}

impl DeltaDispatcher {
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    /// Decode one text frame and dispatch its updates.
    ///
    /// Returns the number of path/value pairs handed to the registry.
    /// Decode failure yields `MalformedMessage` and affects no other frame.
    pub fn handle_frame(&self, text: &str) -> StreamResult<usize> {
        let message: DeltaMessage = serde_json::from_str(text)?;
        Ok(self.handle_message(message))
    }

    /// Dispatch an already decoded delta message.
    ///
    /// Messages without updates are discarded; so is any path/value pair
    /// missing either half.
    pub fn handle_message(&self, message: DeltaMessage) -> usize {
        let mut dispatched = 0;
        for update in message.updates {
            for pair in update.values {
                let (Some(path), Some(value)) = (pair.path, pair.value) else {
                    continue;
                };
                let envelope =
                    UpdateEnvelope::new(update.source.clone(), update.timestamp.clone(), value);
                trace!(path, "dispatching update");
                self.registry.dispatch(&path, &envelope);
                dispatched += 1;
            }
        }
        dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::connection::ConnectionState;
    use crate::stream::consumer::{ConsumerEntry, DeliveryShape, DeliveryTarget};
    use crate::stream::errors::StreamError;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tokio::sync::{mpsc, watch};

    fn dispatcher() -> (
        DeltaDispatcher,
        Arc<SubscriptionRegistry>,
        mpsc::UnboundedReceiver<String>,
    ) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Open);
        drop(state_tx);
        let registry = Arc::new(SubscriptionRegistry::new(outbound_tx, state_rx));
        (
            DeltaDispatcher::new(Arc::clone(&registry)),
            registry,
            outbound_rx,
        )
    }

    fn collector(registry: &SubscriptionRegistry, path: &str) -> Arc<Mutex<Vec<Value>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry
            .register(
                path,
                ConsumerEntry::new(
                    DeliveryTarget::from_fn(move |v| sink.lock().unwrap().push(v)),
                    None,
                    DeliveryShape::Bare,
                ),
            )
            .unwrap();
        seen
    }

    #[test]
    fn test_two_paths_fan_out_independently() {
        let (dispatcher, registry, _outbound) = dispatcher();
        let speed = collector(&registry, "navigation.speedOverGround");
        let depth = collector(&registry, "environment.depth.belowKeel");

        let frame = json!({
            "updates": [{
                "$source": "nmea.0",
                "timestamp": "2024-05-01T12:00:00Z",
                "values": [
                    {"path": "navigation.speedOverGround", "value": 3.2},
                    {"path": "environment.depth.belowKeel", "value": 8.4}
                ]
            }]
        });

        assert_eq!(dispatcher.handle_frame(&frame.to_string()).unwrap(), 2);
        assert_eq!(*speed.lock().unwrap(), vec![json!(3.2)]);
        assert_eq!(*depth.lock().unwrap(), vec![json!(8.4)]);
    }

    #[test]
    fn test_empty_updates_are_discarded() {
        let (dispatcher, _registry, _outbound) = dispatcher();
        assert_eq!(dispatcher.handle_frame("{}").unwrap(), 0);
        assert_eq!(dispatcher.handle_frame(r#"{"updates": []}"#).unwrap(), 0);
    }

    #[test]
    fn test_pairs_missing_path_or_value_are_skipped() {
        let (dispatcher, registry, _outbound) = dispatcher();
        let seen = collector(&registry, "a.b");

        let frame = json!({
            "updates": [{
                "values": [
                    {"path": "a.b"},
                    {"value": 1},
                    {"path": "a.b", "value": 2}
                ]
            }]
        });

        assert_eq!(dispatcher.handle_frame(&frame.to_string()).unwrap(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![json!(2)]);
    }

    #[test]
    fn test_malformed_frame_is_isolated() {
        let (dispatcher, registry, _outbound) = dispatcher();
        let seen = collector(&registry, "a.b");

        let result = dispatcher.handle_frame("not json at all");
        assert!(matches!(result, Err(StreamError::MalformedMessage(_))));

        // The next frame still dispatches.
        let frame = json!({"updates": [{"values": [{"path": "a.b", "value": 9}]}]});
        assert_eq!(dispatcher.handle_frame(&frame.to_string()).unwrap(), 1);
        assert_eq!(*seen.lock().unwrap(), vec![json!(9)]);
    }
}
