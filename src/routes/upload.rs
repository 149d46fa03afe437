//! Out-of-band upload endpoint for videos and generic files.
//!
//! Accepts a multipart form with a `chatFile` part and an optional
//! `username` field, runs the media pipeline, and pushes the finished
//! message to every connected socket regardless of this response.

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::ApiError;
use crate::message::{MediaAttachment, Message};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub file_url: String,
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut username: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Malformed multipart body"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("chatFile") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::bad_request("Failed to read file part"))?;
                file = Some((file_name, mime, bytes.to_vec()));
            }
            Some("username") => {
                username = field.text().await.ok();
            }
            _ => {}
        }
    }

    let (original_name, declared_mime, bytes) = file.ok_or_else(ApiError::no_file)?;
    let sender = username
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    tracing::info!(
        %sender,
        file_name = %original_name,
        mime = %declared_mime,
        size = bytes.len(),
        "upload accepted"
    );

    let job = state.media.store(&original_name, &declared_mime, &bytes).await?;
    let processed = state.media.process(job).await;

    let message = Message::media(
        &sender,
        processed.kind,
        MediaAttachment {
            file: processed.url.clone(),
            file_type: processed.mime_type,
            file_name: original_name,
            file_size: processed.size_bytes,
        },
    );
    state.room.append_message(message);

    Ok(Json(UploadResponse {
        message: "File uploaded and processed successfully".to_string(),
        file_url: processed.url,
    }))
}
