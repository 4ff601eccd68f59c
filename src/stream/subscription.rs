//! # Subscription Registry
//!
//! The stateful heart of the client: a mapping from data-tree path to an
//! insertion-ordered list of consumer entries.
//!
//! Invariants:
//! - a subscribe message goes to the server exactly once per distinct path,
//!   at the moment its entry list comes into existence;
//! - the same consumer identity is never registered twice under one path;
//! - paths are never removed (there is no unsubscribe in this design).

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::connection::ConnectionState;
use super::consumer::ConsumerEntry;
use super::errors::{StreamError, StreamResult};
use crate::protocol::messages::{SubscribeMessage, UpdateEnvelope};

/// Registry of path subscriptions and their consumers.
///
/// All mutation and lookup is serialized behind one lock; the transport's
/// read task and application tasks may touch the registry concurrently.
pub struct SubscriptionRegistry {
    directory: Mutex<HashMap<String, Vec<ConsumerEntry>>>,
    outbound: mpsc::UnboundedSender<String>,
    state: watch::Receiver<ConnectionState>,
}

impl SubscriptionRegistry {
    /// Create a registry that frames subscribe requests onto `outbound` and
    /// checks connection liveness through `state`.
    pub fn new(
        outbound: mpsc::UnboundedSender<String>,
        state: watch::Receiver<ConnectionState>,
    ) -> Self {
        Self {
            directory: Mutex::new(HashMap::new()),
            outbound,
            state,
        }
    }

    /// Register a consumer entry for `path`.
    ///
    /// The first registration for a path sends exactly one subscribe
    /// message; the check and the entry-list creation happen under the
    /// registry lock so concurrent registrations cannot double-subscribe.
    /// A duplicate consumer identity is a warning-logged no-op.
    pub fn register(&self, path: &str, entry: ConsumerEntry) -> StreamResult<()> {
        if path.is_empty() {
            return Err(StreamError::InvalidArgument(
                "subscription path must not be empty".to_string(),
            ));
        }
        if self.state.borrow().is_terminal() {
            return Err(StreamError::NotConnected);
        }

        let mut directory = self
            .directory
            .lock()
            .map_err(|_| StreamError::Internal("registry lock poisoned".to_string()))?;

        let entries = match directory.entry(path.to_string()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                let frame = SubscribeMessage::for_path(path)
                    .to_frame()
                    .map_err(|e| StreamError::Internal(e.to_string()))?;
                self.outbound
                    .send(frame)
                    .map_err(|_| StreamError::NotConnected)?;
                debug!(path, "subscribed");
                vacant.insert(Vec::new())
            }
        };

        if entries
            .iter()
            .any(|existing| existing.target().same_consumer(entry.target()))
        {
            warn!(path, "refusing to register a duplicate consumer");
            return Ok(());
        }

        entries.push(entry);
        Ok(())
    }

    /// Fan one update envelope out to every consumer registered for `path`,
    /// in registration order.
    ///
    /// An unknown path is dropped silently: the server may push data for
    /// paths this client never asked about.
    pub fn dispatch(&self, path: &str, envelope: &UpdateEnvelope) {
        let entries = {
            let directory = match self.directory.lock() {
                Ok(directory) => directory,
                Err(_) => return,
            };
            match directory.get(path) {
                Some(entries) => entries.clone(),
                None => return,
            }
        };

        // Deliver outside the lock so a consumer may call back into the
        // registry.
        for entry in &entries {
            entry.deliver(envelope);
        }
    }

    /// Number of distinct subscribed paths.
    pub fn path_count(&self) -> usize {
        self.directory.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// Number of consumers registered for `path`.
    pub fn consumer_count(&self, path: &str) -> usize {
        self.directory
            .lock()
            .map(|d| d.get(path).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::consumer::{DeliveryShape, DeliveryTarget};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn open_registry() -> (SubscriptionRegistry, mpsc::UnboundedReceiver<String>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (_state_tx, state_rx) = watch::channel(ConnectionState::Open);
        (SubscriptionRegistry::new(outbound_tx, state_rx), outbound_rx)
    }

    fn bare_entry(target: DeliveryTarget) -> ConsumerEntry {
        ConsumerEntry::new(target, None, DeliveryShape::Bare)
    }

    #[test]
    fn test_first_registration_subscribes_once() {
        let (registry, mut outbound) = open_registry();

        registry
            .register("navigation.position", bare_entry(DeliveryTarget::from_fn(|_| {})))
            .unwrap();
        registry
            .register("navigation.position", bare_entry(DeliveryTarget::from_fn(|_| {})))
            .unwrap();

        let frame: Value = serde_json::from_str(&outbound.try_recv().unwrap()).unwrap();
        assert_eq!(frame["subscribe"][0]["path"], "navigation.position");
        assert!(outbound.try_recv().is_err());
        assert_eq!(registry.consumer_count("navigation.position"), 2);
    }

    #[test]
    fn test_duplicate_consumer_is_a_noop() {
        let (registry, mut outbound) = open_registry();
        let target = DeliveryTarget::from_fn(|_| {});

        registry.register("a.b", bare_entry(target.clone())).unwrap();
        registry.register("a.b", bare_entry(target)).unwrap();

        assert_eq!(registry.consumer_count("a.b"), 1);
        assert!(outbound.try_recv().is_ok());
        assert!(outbound.try_recv().is_err());
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let (registry, _outbound) = open_registry();
        let result = registry.register("", bare_entry(DeliveryTarget::from_fn(|_| {})));
        assert!(matches!(result, Err(StreamError::InvalidArgument(_))));
    }

    #[test]
    fn test_register_requires_live_connection() {
        let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Errored);
        let registry = SubscriptionRegistry::new(outbound_tx, state_rx);
        drop(state_tx);

        let result = registry.register("a.b", bare_entry(DeliveryTarget::from_fn(|_| {})));
        assert!(matches!(result, Err(StreamError::NotConnected)));
    }

    #[test]
    fn test_dispatch_unknown_path_is_dropped() {
        let (registry, _outbound) = open_registry();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry
            .register("a.b", bare_entry(DeliveryTarget::from_fn(move |v| {
                sink.lock().unwrap().push(v)
            })))
            .unwrap();

        registry.dispatch(
            "c.d",
            &UpdateEnvelope::new(None, None, json!(1)),
        );
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_preserves_registration_order() {
        let (registry, _outbound) = open_registry();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            registry
                .register("a.b", bare_entry(DeliveryTarget::from_fn(move |_| {
                    order.lock().unwrap().push(tag)
                })))
                .unwrap();
        }

        registry.dispatch("a.b", &UpdateEnvelope::new(None, None, json!(1)));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }
}
