//! Chat message model shared by the history store, the gateway wire format,
//! and the media pipeline.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// What a message carries. `System` is reserved for server-generated
/// join/leave announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Video,
    File,
    System,
}

/// Media details attached to an image/video/file message.
///
/// `file` is either an inline base64 payload (images sent over the socket)
/// or a relative URL under `/uploads` or `/compressed_videos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    pub file: String,
    pub file_type: String,
    pub file_name: String,
    pub file_size: u64,
}

/// A single chat message. Immutable once constructed; the history store
/// only ever appends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    /// Text body, or the original file name for media messages.
    pub message: String,
    /// Wall-clock arrival time, formatted `HH:MM:SS`.
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(flatten)]
    pub media: Option<MediaAttachment>,
}

impl Message {
    /// A server-generated announcement (joins and leaves).
    pub fn system(body: impl Into<String>) -> Self {
        Self {
            sender: "System".to_string(),
            message: body.into(),
            timestamp: now(),
            kind: MessageKind::System,
            media: None,
        }
    }

    /// An ordinary text message from a joined user.
    pub fn text(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: body.into(),
            timestamp: now(),
            kind: MessageKind::Text,
            media: None,
        }
    }

    /// A media message. The visible body is the original file name.
    pub fn media(sender: impl Into<String>, kind: MessageKind, attachment: MediaAttachment) -> Self {
        Self {
            sender: sender.into(),
            message: attachment.file_name.clone(),
            timestamp: now(),
            kind,
            media: Some(attachment),
        }
    }
}

fn now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message_wire_shape() {
        let msg = Message::text("alice", "hi");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["sender"], "alice");
        assert_eq!(value["message"], "hi");
        assert_eq!(value["type"], "text");
        // No media keys leak into a plain text message.
        assert!(value.get("file").is_none());
        assert!(value.get("fileType").is_none());
    }

    #[test]
    fn media_message_flattens_attachment() {
        let msg = Message::media(
            "bob",
            MessageKind::File,
            MediaAttachment {
                file: "/uploads/123-notes.txt".to_string(),
                file_type: "text/plain".to_string(),
                file_name: "notes.txt".to_string(),
                file_size: 42,
            },
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["message"], "notes.txt");
        assert_eq!(value["file"], "/uploads/123-notes.txt");
        assert_eq!(value["fileType"], "text/plain");
        assert_eq!(value["fileName"], "notes.txt");
        assert_eq!(value["fileSize"], 42);
    }

    #[test]
    fn system_message_uses_system_sender() {
        let msg = Message::system("alice has joined the chat.");
        assert_eq!(msg.sender, "System");
        assert_eq!(msg.kind, MessageKind::System);
    }

    #[test]
    fn round_trips_through_json() {
        let msg = Message::media(
            "carol",
            MessageKind::Video,
            MediaAttachment {
                file: "/compressed_videos/1-clip_compressed_2.mp4".to_string(),
                file_type: "video/mp4".to_string(),
                file_name: "clip.mov".to_string(),
                file_size: 1024,
            },
        );
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
