//! # Path Handling
//!
//! Flattening of the server's nested tree document into dotted paths, and
//! translation of dotted paths into REST resource addresses.
//!
//! A tree node is a *leaf* when it is a non-object scalar, or an object that
//! is empty or carries the reserved `"value"` key. Every other object is a
//! *branch* whose keys are child names.

use serde_json::Value;

/// Reserved key marking a tree node as a leaf document.
pub const VALUE_KEY: &str = "value";

/// REST root for the local vessel's data tree.
pub const API_ROOT: &str = "/signalk/v1/api/vessels/self/";

/// Streaming endpoint, opened without any implicit subscription.
pub const STREAM_PATH: &str = "/signalk/v1/stream?subscribe=none";

/// Flatten a tree document into its leaf paths, in document key order.
///
/// The root prefix is the empty string, so `flatten(&json!({}))` yields
/// `[""]` and no path ever starts with a `.`.
pub fn flatten(tree: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    descend(tree, String::new(), &mut paths);
    paths
}

fn descend(node: &Value, prefix: String, out: &mut Vec<String>) {
    match node.as_object() {
        Some(map) if !map.is_empty() && !map.contains_key(VALUE_KEY) => {
            for (key, child) in map {
                let joined = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                descend(child, joined, out);
            }
        }
        _ => out.push(prefix),
    }
}

/// Translate a dotted application path into its REST resource address.
///
/// Everything before the first `[` is the dotted segment (with `.`
/// separators replaced by `/`); a bracketed index suffix is appended
/// verbatim, so `electrical.batteries[0].voltage` keeps its index.
pub fn to_resource_path(path: &str) -> String {
    let (dotted, bracketed) = match path.find('[') {
        Some(i) => path.split_at(i),
        None => (path, ""),
    };
    format!("{}{}{}", API_ROOT, dotted.replace('.', "/"), bracketed)
}

/// Websocket URL of the streaming endpoint on `host:port`.
pub fn stream_url(host: &str, port: u16) -> String {
    format!("ws://{}:{}{}", host, port, STREAM_PATH)
}

/// Default unwrap rule: a document with a `"value"` member yields that
/// member, anything else passes through unchanged.
pub fn unwrap_value(doc: Value) -> Value {
    match doc {
        Value::Object(mut map) => match map.remove(VALUE_KEY) {
            Some(value) => value,
            None => Value::Object(map),
        },
        other => other,
    }
}
