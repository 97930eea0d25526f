//! WebSocket support for real-time job updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use optimux_core::{EngineEvent, FileResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Interval between heartbeats.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// A job was accepted and the encoder is starting.
    JobStarted { job_id: String },
    /// Encoder progress snapshot.
    Progress {
        job_id: String,
        time_sec: f64,
        size: u64,
    },
    /// One line of encoder log output.
    Log { job_id: String, line: String },
    /// A job finished and every output was verified.
    JobCompleted {
        job_id: String,
        files: Vec<FileResult>,
    },
    /// A job failed; `kind` is the stable error kind.
    JobFailed {
        job_id: String,
        kind: String,
        error: String,
    },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    /// Label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WsMessage::JobStarted { .. } => "job_started",
            WsMessage::Progress { .. } => "progress",
            WsMessage::Log { .. } => "log",
            WsMessage::JobCompleted { .. } => "job_completed",
            WsMessage::JobFailed { .. } => "job_failed",
            WsMessage::Heartbeat { .. } => "heartbeat",
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // No receivers just means nobody is connected.
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    pub fn job_started(&self, job_id: &str) {
        self.broadcast(WsMessage::JobStarted {
            job_id: job_id.to_string(),
        });
    }

    /// Tags an engine event with its job and broadcasts it.
    pub fn engine_event(&self, job_id: &str, event: EngineEvent) {
        let msg = match event {
            EngineEvent::Progress(snapshot) => WsMessage::Progress {
                job_id: job_id.to_string(),
                time_sec: snapshot.time_sec,
                size: snapshot.size,
            },
            EngineEvent::Log { line } => WsMessage::Log {
                job_id: job_id.to_string(),
                line,
            },
        };
        self.broadcast(msg);
    }

    pub fn job_completed(&self, job_id: &str, files: Vec<FileResult>) {
        self.broadcast(WsMessage::JobCompleted {
            job_id: job_id.to_string(),
            files,
        });
    }

    pub fn job_failed(&self, job_id: &str, kind: &str, error: &str) {
        self.broadcast(WsMessage::JobFailed {
            job_id: job_id.to_string(),
            kind: kind.to_string(),
            error: error.to_string(),
        });
    }

    pub fn heartbeat(&self) {
        self.broadcast(WsMessage::Heartbeat {
            timestamp: Utc::now().timestamp(),
        });
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Sends a heartbeat every `interval` until the task is aborted.
pub fn spawn_heartbeat(broadcaster: WsBroadcaster, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            broadcaster.heartbeat();
        }
    })
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut rx = state.ws_broadcaster().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    WS_MESSAGES_SENT.with_label_values(&[msg.kind()]).inc();

                    match serde_json::to_string(&msg) {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                debug!("WebSocket send failed, client disconnected");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to serialize WsMessage: {}", e);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged, skipped {} messages", n);
                    WS_LAG_EVENTS.inc();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Clients only send close and ping frames.
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Ignoring client message: {}", text.as_str());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}
