//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use crate::AppState;

use super::handler;
use super::session::Connection;

/// Application-level close code for an unrecoverable connection.
const CLOSE_INTERNAL_ERROR: u16 = 4000;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Subscribe before entering the loop so nothing broadcast after the
    // upgrade can be missed.
    let mut broadcast_rx = state.broadcast.subscribe();
    let mut conn = Connection::new();

    tracing::debug!(conn_id = %conn.id, "client connected");

    loop {
        tokio::select! {
            // Client sends us a frame.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let event = match serde_json::from_str(&text) {
                            Ok(event) => event,
                            Err(err) => {
                                // Permissive protocol: drop the frame, keep
                                // the connection.
                                tracing::debug!(conn_id = %conn.id, %err, "unparseable frame dropped");
                                continue;
                            }
                        };
                        if handler::handle_event(&state, &mut conn, event).is_err() {
                            tracing::error!(conn_id = %conn.id, "duplicate connection id, closing");
                            let _ = send_close(&mut ws_tx, CLOSE_INTERNAL_ERROR, "Duplicate connection").await;
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(conn_id = %conn.id, ?err, "ws read error");
                        break;
                    }
                    _ => continue, // Binary frames are not part of the protocol.
                }
            }

            // Outbound frame from the fan-out hub.
            result = broadcast_rx.recv() => {
                match result {
                    Ok(frame) => {
                        if !frame.audience.includes(&conn.id) {
                            continue;
                        }
                        let json = match serde_json::to_string(&frame.event) {
                            Ok(json) => json,
                            Err(err) => {
                                tracing::error!(?err, "failed to serialize outbound event");
                                continue;
                            }
                        };
                        if ws_tx.send(Message::Text(json.into())).await.is_err() {
                            // This peer is gone; everyone else keeps
                            // receiving through their own loops.
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(conn_id = %conn.id, skipped, "connection lagged behind broadcast");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    handler::handle_disconnect(&state, &mut conn);
    tracing::debug!(conn_id = %conn.id, "client disconnected");
}

async fn send_close(
    ws_tx: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    code: u16,
    reason: &str,
) -> Result<(), axum::Error> {
    let close_msg = Message::Close(Some(CloseFrame {
        code,
        reason: reason.to_string().into(),
    }));
    ws_tx.send(close_msg).await
}
