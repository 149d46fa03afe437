//! Inbound event dispatch: the protocol transition table.
//!
//! The permissive rules of the observed protocol apply throughout: an event
//! that is invalid for the connection's phase is dropped and logged at
//! debug, never answered with an error frame.

use crate::media;
use crate::state::DuplicateConnection;
use crate::AppState;

use super::events::{ClientEvent, ServerEvent};
use super::session::Connection;

/// Route one client event through the room. `Err` means the connection hit
/// an unrecoverable condition and must be closed.
pub fn handle_event(
    state: &AppState,
    conn: &mut Connection,
    event: ClientEvent,
) -> Result<(), DuplicateConnection> {
    match event {
        ClientEvent::Join(display_name) => {
            if conn.is_joined() {
                tracing::debug!(conn_id = %conn.id, "join after join dropped");
                return Ok(());
            }
            state.room.join(&conn.id, &display_name)?;
            conn.join(display_name.clone());
            tracing::info!(conn_id = %conn.id, %display_name, "user joined");
            Ok(())
        }

        ClientEvent::Chat(body) => {
            match conn.display_name() {
                Some(sender) => {
                    state.room.append_chat(sender, &body);
                }
                None => {
                    tracing::debug!(conn_id = %conn.id, "chat before join dropped");
                }
            }
            Ok(())
        }

        ClientEvent::Typing(display_name) => {
            if conn.is_joined() {
                state
                    .broadcast
                    .broadcast_except(ServerEvent::Typing(display_name), &conn.id);
            } else {
                tracing::debug!(conn_id = %conn.id, "typing before join dropped");
            }
            Ok(())
        }

        ClientEvent::FileUpload(upload) => {
            let Some(sender) = conn.display_name() else {
                tracing::debug!(conn_id = %conn.id, "file-upload before join dropped");
                return Ok(());
            };
            match media::inline_image_message(sender, upload) {
                Ok(message) => state.room.append_message(message),
                Err(err) => {
                    tracing::debug!(conn_id = %conn.id, %err, "inline upload dropped");
                }
            }
            Ok(())
        }
    }
}

/// Transport-level disconnect, from any phase.
pub fn handle_disconnect(state: &AppState, conn: &mut Connection) {
    conn.disconnect();
    if let Some(display_name) = state.room.leave(&conn.id) {
        tracing::info!(conn_id = %conn.id, %display_name, "user left");
    }
}
