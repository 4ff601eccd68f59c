//! # Value Fetcher
//!
//! Single-shot reads from the server data tree: a GET on the resource path,
//! an optional transform, and delivery either by return value or through a
//! delivery target.

use serde_json::Value;
use tracing::debug;

use super::errors::{FetchError, FetchResult};
use crate::protocol::paths::{flatten, to_resource_path, unwrap_value};
use crate::stream::consumer::{DeliveryTarget, UpdateFilter};

/// Pull-based reader for one server's data tree.
pub struct ValueFetcher {
    http: reqwest::Client,
    base: String,
}

impl ValueFetcher {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: format!("http://{}:{}", host, port),
        }
    }

    /// GET and decode the document at `path`. The empty path reads the
    /// whole tree.
    async fn get_document(&self, path: &str) -> FetchResult<Value> {
        let url = format!("{}{}", self.base, to_resource_path(path));
        debug!(%url, "fetching document");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Eager single-shot read.
    ///
    /// A failed fetch yields `None` rather than an error; a successful
    /// response that is not valid JSON still surfaces as `Decode`. Without
    /// a filter the default unwrap rule applies.
    pub async fn fetch(&self, path: &str, filter: Option<&UpdateFilter>) -> FetchResult<Option<Value>> {
        match self.get_document(path).await {
            Ok(doc) => Ok(Some(apply_filter(doc, filter))),
            Err(FetchError::Decode(e)) => Err(FetchError::Decode(e)),
            Err(e) => {
                debug!(path, error = %e, "read yielded nothing");
                Ok(None)
            }
        }
    }

    /// Routed single-shot read: the result goes through the same delivery
    /// polymorphism as a subscription. Fetch failure is an error and the
    /// target is not invoked.
    pub async fn fetch_into(
        &self,
        path: &str,
        target: &DeliveryTarget,
        filter: Option<&UpdateFilter>,
    ) -> FetchResult<()> {
        let doc = self.get_document(path).await?;
        target.deliver(apply_filter(doc, filter));
        Ok(())
    }

    /// Every leaf path of the server data tree, in document order.
    pub async fn fetch_tree(&self) -> FetchResult<Vec<String>> {
        let doc = self.get_document("").await?;
        Ok(flatten(&doc))
    }
}

fn apply_filter(doc: Value, filter: Option<&UpdateFilter>) -> Value {
    match filter {
        Some(filter) => filter(doc),
        None => unwrap_value(doc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_default_unwraps_value_member() {
        let doc = json!({"value": 12.3, "timestamp": "2024-05-01T12:00:00Z"});
        assert_eq!(apply_filter(doc, None), json!(12.3));
    }

    #[test]
    fn test_default_passes_raw_scalars_through() {
        assert_eq!(apply_filter(json!(7), None), json!(7));
    }

    #[test]
    fn test_filter_overrides_default() {
        let filter: UpdateFilter = Arc::new(|doc: Value| doc["timestamp"].clone());
        let doc = json!({"value": 12.3, "timestamp": "t0"});
        assert_eq!(apply_filter(doc, Some(&filter)), json!("t0"));
    }

    #[tokio::test]
    async fn test_unreachable_server_reads_as_absence() {
        // Port 9 (discard) is as close to a guaranteed refusal as it gets.
        let fetcher = ValueFetcher::new("127.0.0.1", 9);
        let value = fetcher.fetch("navigation.position", None).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_errors_for_routed_reads() {
        let fetcher = ValueFetcher::new("127.0.0.1", 9);
        let target = DeliveryTarget::from_fn(|_| panic!("target must not be invoked"));
        let result = fetcher.fetch_into("navigation.position", &target, None).await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
