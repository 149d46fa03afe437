//! Wire-format events exchanged over the chat WebSocket.
//!
//! Every frame is a JSON object `{ "event": <name>, "data": <payload> }`.

use serde::{Deserialize, Serialize};

use crate::message::Message;

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// An event received from a client.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Claim a display name. Valid only once, before anything else.
    Join(String),
    /// A raw text message.
    Chat(String),
    /// Keystroke-driven typing notice; the server relays it verbatim.
    Typing(String),
    /// A still image, pre-compressed client-side, carried inline as base64.
    FileUpload(InlineUpload),
}

/// Payload of a `file-upload` event. `file_content` stays opaque — the
/// server validates it decodes as base64 but never re-encodes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineUpload {
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub file_content: String,
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// An event dispatched to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A chat message: user text, media, or a system announcement.
    Chat(Message),
    /// Full history replay, sent to a connection once on join.
    ChatHistory(Vec<Message>),
    /// Someone other than the recipient is typing.
    Typing(String),
    /// The roster, in join order.
    OnlineUsers(Vec<String>),
}
