//! # Connection Lifecycle
//!
//! Owns the one websocket connection a client ever makes. A single attempt
//! is made at construction; transport failure is terminal and reported, not
//! retried.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info, warn};

use super::dispatcher::DeltaDispatcher;
use super::errors::{StreamError, StreamResult};
use crate::protocol::paths::stream_url;

/// Lifecycle state of the streaming connection.
///
/// `Connecting -> Open -> Closed`, with `Errored` reachable from either
/// non-terminal state. Both `Closed` and `Errored` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Errored,
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Errored)
    }
}

/// Handle on the streaming connection owned by one client instance.
pub struct Connection {
    state: watch::Receiver<ConnectionState>,
}

impl Connection {
    /// Validate the host specification and start the single connection
    /// attempt in the background.
    ///
    /// Fails fast with `InvalidHostSpec` before any I/O. Incoming text
    /// frames are routed through `dispatcher`; frames queued on `outbound`
    /// are written to the socket once it is open.
    pub fn open(
        host: &str,
        port: u16,
        state_tx: watch::Sender<ConnectionState>,
        dispatcher: Arc<DeltaDispatcher>,
        outbound: mpsc::UnboundedReceiver<String>,
    ) -> StreamResult<Self> {
        if host.trim().is_empty() {
            return Err(StreamError::InvalidHostSpec(
                "host must not be empty".to_string(),
            ));
        }
        if port == 0 {
            return Err(StreamError::InvalidHostSpec(
                "port must be non-zero".to_string(),
            ));
        }

        let url = stream_url(host, port);
        let state = state_tx.subscribe();
        tokio::spawn(run_connection(url, state_tx, dispatcher, outbound));
        Ok(Self { state })
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// A fresh receiver for liveness checks elsewhere in the client.
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Suspend until the connection reaches `Open`.
    ///
    /// Never resumes once the state goes terminal without having been open:
    /// there is no internal timeout, callers needing a bound apply their
    /// own. The suspension never blocks the dispatch loop.
    pub async fn wait_until_open(&self) {
        let mut state = self.state.clone();
        loop {
            let current = *state.borrow();
            match current {
                ConnectionState::Open => return,
                ConnectionState::Connecting => {}
                ConnectionState::Closed | ConnectionState::Errored => {
                    std::future::pending::<()>().await;
                }
            }
            if state.changed().await.is_err() {
                // Sender gone without ever reaching Open.
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Drive one connection from handshake to termination.
async fn run_connection(
    url: String,
    state_tx: watch::Sender<ConnectionState>,
    dispatcher: Arc<DeltaDispatcher>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    info!(%url, "opening websocket connection");
    let (socket, _response) = match connect_async(url.as_str()).await {
        Ok(pair) => pair,
        Err(e) => {
            error!(%url, error = %e, "connection failed");
            let _ = state_tx.send(ConnectionState::Errored);
            return;
        }
    };

    info!("connection established");
    let _ = state_tx.send(ConnectionState::Open);

    let (mut sink, mut source) = socket.split();
    loop {
        tokio::select! {
            frame = outbound.recv() => {
                match frame {
                    Some(text) => {
                        if let Err(e) = sink.send(Message::Text(text)).await {
                            error!(error = %e, "send failed");
                            let _ = state_tx.send(ConnectionState::Errored);
                            return;
                        }
                    }
                    // Every sender dropped: the client is gone.
                    None => {
                        let _ = state_tx.send(ConnectionState::Closed);
                        return;
                    }
                }
            }

            incoming = source.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = dispatcher.handle_frame(&text) {
                            warn!(error = %e, "discarding malformed delta frame");
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = sink.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("connection closed by server");
                        let _ = state_tx.send(ConnectionState::Closed);
                        return;
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "receive error");
                        let _ = state_tx.send(ConnectionState::Errored);
                        return;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::subscription::SubscriptionRegistry;
    use tokio::time::{timeout, Duration};

    fn noop_dispatcher(state: watch::Receiver<ConnectionState>) -> Arc<DeltaDispatcher> {
        let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();
        let registry = Arc::new(SubscriptionRegistry::new(outbound_tx, state));
        Arc::new(DeltaDispatcher::new(registry))
    }

    #[test]
    fn test_empty_host_fails_before_any_io() {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (_tx, outbound_rx) = mpsc::unbounded_channel();
        let result = Connection::open("", 3000, state_tx, noop_dispatcher(state_rx), outbound_rx);
        assert!(matches!(result, Err(StreamError::InvalidHostSpec(_))));
    }

    #[test]
    fn test_zero_port_fails_before_any_io() {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (_tx, outbound_rx) = mpsc::unbounded_channel();
        let result =
            Connection::open("localhost", 0, state_tx, noop_dispatcher(state_rx), outbound_rx);
        assert!(matches!(result, Err(StreamError::InvalidHostSpec(_))));
    }

    #[tokio::test]
    async fn test_wait_until_open_pends_on_terminal_states() {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let connection = Connection { state: state_rx };

        state_tx.send(ConnectionState::Errored).unwrap();
        let waited = timeout(Duration::from_millis(50), connection.wait_until_open()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_wait_until_open_resumes_on_open() {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let connection = Connection { state: state_rx };

        let waiter = tokio::spawn(async move { connection.wait_until_open().await });
        state_tx.send(ConnectionState::Open).unwrap();
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should resume")
            .unwrap();
    }
}
