//! # Client Registry
//!
//! Explicit install-or-reuse factory: one client per host:port, owned by
//! the embedding application instead of living in ambient global state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::errors::ClientResult;
use super::facade::SignalkClient;
use crate::stream::errors::StreamError;

/// Application-owned registry of installed clients.
#[derive(Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<(String, u16), Arc<SignalkClient>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the client installed for `host:port`, constructing one if
    /// none exists yet. Construction failure installs nothing, so a later
    /// call may try again.
    pub fn install(&self, host: &str, port: u16) -> ClientResult<Arc<SignalkClient>> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| StreamError::Internal("client registry lock poisoned".to_string()))?;

        if let Some(existing) = clients.get(&(host.to_string(), port)) {
            debug!(host, port, "reusing installed client");
            return Ok(Arc::clone(existing));
        }

        let client = Arc::new(SignalkClient::open(host, port)?);
        clients.insert((host.to_string(), port), Arc::clone(&client));
        Ok(client)
    }

    pub fn len(&self) -> usize {
        self.clients.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_install_is_idempotent_per_host_port() {
        let registry = ClientRegistry::new();

        let first = registry.install("localhost", 3000).unwrap();
        let second = registry.install("localhost", 3000).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);

        let other = registry.install("localhost", 3001).unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_failed_construction_installs_nothing() {
        let registry = ClientRegistry::new();
        assert!(registry.install("", 3000).is_err());
        assert!(registry.is_empty());
    }
}
