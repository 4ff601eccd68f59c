//! # Delivery Targets and Consumer Entries
//!
//! Consumers of delivered values come in three shapes: a plain callback, an
//! object exposing an `update` operation, or a text-settable sink. The set
//! is closed and resolved once at registration time, so the dispatch path
//! never probes target kinds dynamically.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::protocol::messages::UpdateEnvelope;

/// Callback consumer signature.
pub type CallbackFn = dyn Fn(Value) + Send + Sync;

/// Pure transform applied to the raw envelope payload before delivery.
pub type FilterFn = dyn Fn(Value) -> Value + Send + Sync;

/// Shared handle to a delivery filter.
pub type UpdateFilter = Arc<FilterFn>;

/// Consumer object exposing an update operation.
pub trait Updatable: Send + Sync {
    fn update(&self, value: Value);
}

/// Display-element-like sink that accepts rendered text.
pub trait TextSink: Send + Sync {
    fn set_text(&self, text: String);
}

/// A delivery target, resolved at registration time.
///
/// Identity for duplicate detection is the `Arc` the caller registered:
/// clone the same `DeliveryTarget` (or wrap the same `Arc`) to re-register
/// the same consumer, which the registry refuses as a duplicate.
#[derive(Clone)]
pub enum DeliveryTarget {
    /// Invoke a function with the delivered value
    Callback(Arc<CallbackFn>),
    /// Call the object's update operation
    Updatable(Arc<dyn Updatable>),
    /// Set the sink's text content
    TextSink(Arc<dyn TextSink>),
}

impl DeliveryTarget {
    /// Wrap a plain closure as a callback target.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        DeliveryTarget::Callback(Arc::new(f))
    }

    pub fn callback(f: Arc<CallbackFn>) -> Self {
        DeliveryTarget::Callback(f)
    }

    pub fn updatable(target: Arc<dyn Updatable>) -> Self {
        DeliveryTarget::Updatable(target)
    }

    pub fn text_sink(sink: Arc<dyn TextSink>) -> Self {
        DeliveryTarget::TextSink(sink)
    }

    /// Application-level identity of the underlying consumer.
    fn identity(&self) -> *const () {
        match self {
            DeliveryTarget::Callback(f) => Arc::as_ptr(f) as *const (),
            DeliveryTarget::Updatable(u) => Arc::as_ptr(u) as *const (),
            DeliveryTarget::TextSink(s) => Arc::as_ptr(s) as *const (),
        }
    }

    /// Whether both targets name the same registered consumer.
    pub fn same_consumer(&self, other: &DeliveryTarget) -> bool {
        self.identity() == other.identity()
    }

    /// Hand one value to the consumer.
    pub fn deliver(&self, value: Value) {
        match self {
            DeliveryTarget::Callback(f) => f(value),
            DeliveryTarget::Updatable(u) => u.update(value),
            DeliveryTarget::TextSink(s) => s.set_text(render_text(value)),
        }
    }
}

impl fmt::Debug for DeliveryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            DeliveryTarget::Callback(_) => "callback",
            DeliveryTarget::Updatable(_) => "updatable",
            DeliveryTarget::TextSink(_) => "text-sink",
        };
        write!(f, "DeliveryTarget({} @ {:p})", kind, self.identity())
    }
}

/// Strings render bare, everything else as its JSON representation.
fn render_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Whether the target receives the bare value or the enveloped form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryShape {
    /// The bare `value` member of the envelope
    #[default]
    Bare,
    /// The full `{source, timestamp, value}` object
    Enveloped,
}

/// One registered consumer: target, optional filter, delivery shape.
#[derive(Clone)]
pub struct ConsumerEntry {
    target: DeliveryTarget,
    filter: Option<UpdateFilter>,
    shape: DeliveryShape,
}

impl ConsumerEntry {
    pub fn new(target: DeliveryTarget, filter: Option<UpdateFilter>, shape: DeliveryShape) -> Self {
        Self {
            target,
            filter,
            shape,
        }
    }

    pub fn target(&self) -> &DeliveryTarget {
        &self.target
    }

    /// Deliver one update envelope.
    ///
    /// A filter receives the raw envelope payload and its output is
    /// delivered as-is; without one, the shape flag picks the bare value or
    /// the full envelope.
    pub fn deliver(&self, envelope: &UpdateEnvelope) {
        let value = match &self.filter {
            Some(filter) => filter(envelope.to_json()),
            None => match self.shape {
                DeliveryShape::Bare => envelope.value.clone(),
                DeliveryShape::Enveloped => envelope.to_json(),
            },
        };
        self.target.deliver(value);
    }
}

impl fmt::Debug for ConsumerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerEntry")
            .field("target", &self.target)
            .field("filtered", &self.filter.is_some())
            .field("shape", &self.shape)
            .finish()
    }
}
