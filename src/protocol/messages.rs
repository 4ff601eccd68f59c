//! # Wire Messages
//!
//! Subscribe and put framing for the streaming channel, and decoding of the
//! server-pushed delta messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Context qualifier scoping subscribe/put messages to the local vessel.
pub const SELF_CONTEXT: &str = "vessels.self";

/// Minimum update period requested for every subscription.
pub const DEFAULT_MIN_PERIOD_MS: u64 = 1000;

/// Delivery policy requested for every subscription.
pub const INSTANT_POLICY: &str = "instant";

/// Subscribe request naming one or more paths.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeMessage {
    context: String,
    subscribe: Vec<SubscriptionSpec>,
}

/// One path entry of a subscribe request.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionSpec {
    path: String,
    #[serde(rename = "minPeriod")]
    min_period: u64,
    policy: String,
}

impl SubscribeMessage {
    /// Build a single-path subscription with the fixed minimum period and
    /// instant delivery policy.
    pub fn for_path(path: &str) -> Self {
        Self {
            context: SELF_CONTEXT.to_string(),
            subscribe: vec![SubscriptionSpec {
                path: path.to_string(),
                min_period: DEFAULT_MIN_PERIOD_MS,
                policy: INSTANT_POLICY.to_string(),
            }],
        }
    }

    /// Serialize into a text frame for the streaming channel.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Mutation request for one path.
#[derive(Debug, Clone, Serialize)]
pub struct PutMessage {
    context: String,
    #[serde(rename = "requestId")]
    request_id: String,
    put: PutTarget,
}

#[derive(Debug, Clone, Serialize)]
struct PutTarget {
    path: String,
    value: Value,
}

impl PutMessage {
    /// Build a put request. Any JSON value is legal, including `null`,
    /// `false` and `0`. A missing `request_id` is generated.
    pub fn new(path: &str, value: Value, request_id: Option<String>) -> Self {
        Self {
            context: SELF_CONTEXT.to_string(),
            request_id: request_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            put: PutTarget {
                path: path.to_string(),
                value,
            },
        }
    }

    /// Correlation identifier, returned to the caller so an out-of-scope
    /// layer can match up any response.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Serialize into a text frame for the streaming channel.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Server-pushed delta notification.
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaMessage {
    #[serde(default)]
    pub updates: Vec<DeltaUpdate>,
}

/// One update block of a delta message.
#[derive(Debug, Clone, Deserialize)]
pub struct DeltaUpdate {
    #[serde(rename = "$source")]
    pub source: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub values: Vec<PathValue>,
}

/// One path/value pair of an update block.
#[derive(Debug, Clone, Deserialize)]
pub struct PathValue {
    pub path: Option<String>,
    pub value: Option<Value>,
}

/// The `{source, timestamp, value}` wrapper around one delivered value.
/// Constructed per incoming update value, never retained.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateEnvelope {
    pub source: Option<String>,
    pub timestamp: Option<String>,
    pub value: Value,
}

impl UpdateEnvelope {
    pub fn new(source: Option<String>, timestamp: Option<String>, value: Value) -> Self {
        Self {
            source,
            timestamp,
            value,
        }
    }

    /// The enveloped form as a JSON object.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "source": self.source,
            "timestamp": self.timestamp,
            "value": self.value,
        })
    }
}
