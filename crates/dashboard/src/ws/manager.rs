use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

use envmon_core::air_quality::AirQualityBand;
use envmon_core::cycle::CycleOutput;
use envmon_core::types::Timestamp;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

pub const MSG_TYPE_CYCLE: &str = "cycle";

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        if let Some(conn) = self.connections.write().await.remove(conn_id) {
            let secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
            tracing::debug!(conn_id, connected_secs = secs, "WebSocket connection removed");
        }
    }

    /// Broadcast a message to all connected clients.
    ///
    /// Connections whose send channels are closed are skipped; they are
    /// removed when their receive loop ends.
    pub async fn broadcast(&self, message: Message) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct CyclePayload<'a> {
    r#type: &'static str,
    #[serde(flatten)]
    output: &'a CycleOutput,
    air_quality_band: AirQualityBand,
}

/// JSON text frame `{ "type": "cycle", ... }` for one cycle output.
pub fn cycle_message(output: &CycleOutput) -> Message {
    let payload = CyclePayload {
        r#type: MSG_TYPE_CYCLE,
        output,
        air_quality_band: output.air_quality_band(),
    };
    let json = serde_json::to_string(&payload).expect("CyclePayload is always serialisable");
    Message::Text(json.into())
}
