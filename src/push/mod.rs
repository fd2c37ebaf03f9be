//! Live push updates from the server.
//!
//! The server pushes each newly created log as a JSON text frame over a
//! WebSocket. [`listen`] decodes the stream and fans each record out through
//! a [`PushHub`]; subscribers ingest the records into the local cache.
//! Reconnection is the caller's concern; a closed connection simply ends the
//! listen call.

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::models::LogRecord;

/// Buffered events per subscriber before older ones are dropped.
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("websocket error: {0}")]
    WebSocket(String),
}

/// Publish/subscribe registry for pushed records.
///
/// Subscribing returns a receiver; dropping it unsubscribes. Delivery order
/// across subscribers is unspecified, and a subscriber registered during
/// delivery does not see the in-flight event. Duplicate events are harmless
/// downstream because ingestion is an upsert by id.
#[derive(Clone)]
pub struct PushHub {
    tx: broadcast::Sender<LogRecord>,
}

impl PushHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogRecord> {
        self.tx.subscribe()
    }

    /// Delivers a record to all current subscribers. Returns the number of
    /// subscribers reached; zero subscribers is not an error.
    pub fn publish(&self, record: LogRecord) -> usize {
        self.tx.send(record).unwrap_or(0)
    }
}

impl Default for PushHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the WebSocket URL from the configured server URL, converting
/// http(s) schemes to ws(s).
pub fn build_ws_url(server_url: &str) -> String {
    if server_url.starts_with("http://") {
        server_url.replacen("http://", "ws://", 1)
    } else if server_url.starts_with("https://") {
        server_url.replacen("https://", "wss://", 1)
    } else if !server_url.starts_with("ws://") && !server_url.starts_with("wss://") {
        format!("ws://{}", server_url)
    } else {
        server_url.to_string()
    }
}

/// Connects to the push endpoint and publishes each pushed record to `hub`
/// until the server closes the connection. Malformed frames are logged and
/// skipped.
pub async fn listen(server_url: &str, hub: &PushHub) -> Result<(), PushError> {
    let ws_url = build_ws_url(server_url);
    tracing::info!(url = %ws_url, "connecting to push channel");

    let (ws_stream, _) = connect_async(&ws_url)
        .await
        .map_err(|e| PushError::Connection(e.to_string()))?;

    let (mut sender, mut receiver) = ws_stream.split();

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<LogRecord>(text.as_str()) {
                Ok(record) => {
                    tracing::debug!(id = record.id, "pushed log received");
                    hub.publish(record);
                }
                Err(e) => {
                    tracing::warn!("ignoring malformed push frame: {}", e);
                }
            },
            Ok(Message::Ping(data)) => {
                sender
                    .send(Message::Pong(data))
                    .await
                    .map_err(|e| PushError::WebSocket(e.to_string()))?;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                // Ignore other message types
            }
            Err(e) => return Err(PushError::WebSocket(e.to_string())),
        }
    }

    tracing::info!("push channel disconnected");
    Ok(())
}
