//! Media ingestion: classification, filename hygiene, and the inline
//! image path. The out-of-band HTTP path lives in [`pipeline`]; the
//! external transcode tool behind [`transcode::Transcoder`].

pub mod pipeline;
pub mod transcode;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::gateway::events::InlineUpload;
use crate::message::{MediaAttachment, Message, MessageKind};

/// A malformed inline upload. Logged server-side, never echoed to the
/// sender (the socket protocol surfaces no errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPayload(pub &'static str);

impl std::fmt::Display for InvalidPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid inline upload: {}", self.0)
    }
}

/// Classify a declared mime type into the message kind the pipeline routes
/// on. Anything that is neither image nor video is a generic file.
pub fn classify_mime(mime: &str) -> MessageKind {
    if mime.starts_with("image/") {
        MessageKind::Image
    } else if mime.starts_with("video/") {
        MessageKind::Video
    } else {
        MessageKind::File
    }
}

/// Neutralize a client-supplied filename for use as an on-disk path
/// component. Every byte outside `[A-Za-z0-9.\-_]` becomes `_`; a name
/// that reduces to nothing (or only dots) becomes `upload`.
pub fn sanitize_filename(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        safe
    }
}

/// The inline path: wrap an already-compressed image payload into a
/// message, as given, with no re-processing. The payload must carry
/// non-empty content that decodes as base64 (a `data:*;base64,` prefix is
/// tolerated).
pub fn inline_image_message(sender: &str, upload: InlineUpload) -> Result<Message, InvalidPayload> {
    let encoded = match upload.file_content.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => upload.file_content.as_str(),
    };
    if encoded.is_empty() {
        return Err(InvalidPayload("empty file content"));
    }
    if BASE64.decode(encoded).is_err() {
        return Err(InvalidPayload("content is not valid base64"));
    }

    Ok(Message::media(
        sender,
        MessageKind::Image,
        MediaAttachment {
            file: upload.file_content,
            file_type: upload.file_type,
            file_name: upload.file_name,
            file_size: upload.file_size,
        },
    ))
}
