//! WebSocket connection handler

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::sync::mpsc;

use crate::api::state::AppState;
use crate::protocol::{Inbound, ServerFrame};
use crate::registry::{ConnectionKey, Outbound};
use crate::types::{RelayError, RelayResult};

/// WebSocket upgrade handler for `/ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    upgrade(ws, state)
}

/// `GET /` - WebSocket upgrade when requested, otherwise the client's index page
pub async fn root_handler(
    ws: Option<WebSocketUpgrade>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if let Some(ws) = ws {
        return upgrade(ws, state);
    }

    let index = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::debug!(path = %index.display(), error = %e, "No index page to serve");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

fn upgrade(ws: WebSocketUpgrade, state: Arc<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (key, rx) = state.registry.accept(None);
    tracing::info!(conn = %key, "WebSocket client connected");

    let (sink, stream) = socket.split();
    let mut writer = tokio::spawn(write_loop(sink, rx, state.config.send_timeout));

    // Whichever side stops first ends the connection
    tokio::select! {
        _ = &mut writer => {}
        _ = read_loop(stream, key, &state) => {}
    }
    writer.abort();

    match state.registry.get(key) {
        Some(conn) => {
            state.registry.remove(key);
            let secs = (Utc::now() - conn.connected_at).num_seconds();
            tracing::info!(conn = %conn, role = %conn.role, secs, "WebSocket client disconnected");
        }
        // Already evicted by the router or the heartbeat
        None => tracing::info!(conn = %key, "WebSocket client disconnected"),
    }
}

/// Drain the connection's outbound queue into the socket.
///
/// Stops when the registry drops the queue's sender, on `Close`, or when a
/// write fails or exceeds `write_timeout`.
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Outbound>,
    write_timeout: Duration,
) {
    while let Some(outbound) = rx.recv().await {
        let message = match outbound {
            Outbound::Text(text) => Message::Text(text),
            Outbound::Ping => Message::Ping(Vec::new()),
            Outbound::Close => {
                let _ = tokio::time::timeout(write_timeout, sink.send(Message::Close(None))).await;
                break;
            }
        };

        match tokio::time::timeout(write_timeout, sink.send(message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "WebSocket write failed");
                break;
            }
            Err(_) => {
                tracing::debug!("WebSocket write timed out");
                break;
            }
        }
    }
    let _ = sink.close().await;
}

async fn read_loop(mut stream: SplitStream<WebSocket>, key: ConnectionKey, state: &AppState) {
    while let Some(result) = stream.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(conn = %key, error = %e, "WebSocket read failed");
                break;
            }
        };

        let decoded = match msg {
            Message::Text(text) => Inbound::decode(&text),
            Message::Binary(bytes) => Inbound::decode_bytes(&bytes),
            Message::Pong(_) => {
                state.registry.mark_alive(key);
                continue;
            }
            // Pings are answered by the transport
            Message::Ping(_) => continue,
            Message::Close(_) => break,
        };

        handle_inbound(decoded, key, state).await;
    }
}

/// Act on one decoded client frame
async fn handle_inbound(decoded: RelayResult<Inbound>, key: ConnectionKey, state: &AppState) {
    match decoded {
        Ok(Inbound::Register { role, client_id }) => {
            match state.registry.register(key, role, client_id) {
                Ok(reg) => {
                    if reg.changed {
                        let id = state.registry.get(key).map(|c| c.id).unwrap_or_default();
                        tracing::info!(conn = %key, id = %id, role = %reg.role, "Client registered");
                    } else {
                        tracing::debug!(conn = %key, role = %reg.role, "Registration left role unchanged");
                    }
                    state.touch();
                    reply(state, key, &ServerFrame::welcome(reg.role));
                }
                Err(e) => reject(state, key, e),
            }
        }
        Ok(Inbound::Command(command)) => {
            // Any connection may issue commands, whatever its role
            let delivered = state.dispatch_command(&command).await;
            tracing::info!(conn = %key, cmd = %command.cmd, delivered, entry = "ws", "Command broadcast");
        }
        Ok(Inbound::Other(value)) => {
            tracing::info!(conn = %key, frame = %value, "Unhandled message");
        }
        Err(e @ RelayError::InvalidRole(_)) => reject(state, key, e),
        Err(e) => {
            tracing::warn!(conn = %key, error = %e, "Dropping malformed frame");
        }
    }
}

/// Report a caller-facing error back to the connection
fn reject(state: &AppState, key: ConnectionKey, err: RelayError) {
    tracing::warn!(conn = %key, error = %err, "Registration rejected");
    reply(state, key, &ServerFrame::error(&err));
}

fn reply(state: &AppState, key: ConnectionKey, frame: &ServerFrame) {
    let Some(conn) = state.registry.get(key) else {
        return;
    };
    let result = frame
        .to_json()
        .and_then(|json| conn.try_deliver(Outbound::Text(json)));
    if let Err(e) = result {
        tracing::warn!(conn = %key, error = %e, "Failed to reply");
    }
}
