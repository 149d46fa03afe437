//! Out-of-band ingestion: persist the upload, classify it, transcode video
//! through a bounded pool, and describe the result for dispatch.
//!
//! Transcodes run concurrently with each other and with socket traffic;
//! they touch shared room state only when the caller appends the finished
//! message. A hung ffmpeg holds one permit and blocks only its own job.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;

use crate::message::MessageKind;

use super::transcode::{TranscodeOutcome, Transcoder};
use super::{classify_mime, sanitize_filename};

/// A persisted upload awaiting processing. Transient: dropped once the
/// resulting message has been dispatched.
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub stored_name: String,
    pub original_name: String,
    pub declared_mime: String,
    pub kind: MessageKind,
    pub size_bytes: u64,
}

/// The pipeline's terminal description of an upload, ready to become a
/// message.
#[derive(Debug, Clone)]
pub struct ProcessedUpload {
    pub kind: MessageKind,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

pub struct MediaPipeline {
    uploads_dir: PathBuf,
    videos_dir: PathBuf,
    transcoder: Arc<dyn Transcoder>,
    /// Caps simultaneous ffmpeg processes; waiters queue FIFO.
    transcode_slots: Semaphore,
}

impl MediaPipeline {
    /// Create the pipeline, making sure both blob directories exist.
    pub async fn new(
        uploads_dir: impl Into<PathBuf>,
        videos_dir: impl Into<PathBuf>,
        transcoder: Arc<dyn Transcoder>,
        max_concurrent_transcodes: usize,
    ) -> io::Result<Self> {
        let uploads_dir = uploads_dir.into();
        let videos_dir = videos_dir.into();
        tokio::fs::create_dir_all(&uploads_dir).await?;
        tokio::fs::create_dir_all(&videos_dir).await?;
        Ok(Self {
            uploads_dir,
            videos_dir,
            transcoder,
            transcode_slots: Semaphore::new(max_concurrent_transcodes),
        })
    }

    /// Persist an accepted upload under a timestamp-prefixed, sanitized
    /// name and classify it by its declared mime type.
    pub async fn store(
        &self,
        original_name: &str,
        declared_mime: &str,
        bytes: &[u8],
    ) -> io::Result<UploadJob> {
        let stored_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_filename(original_name)
        );
        tokio::fs::write(self.uploads_dir.join(&stored_name), bytes).await?;

        Ok(UploadJob {
            stored_name,
            original_name: original_name.to_string(),
            declared_mime: declared_mime.to_string(),
            kind: classify_mime(declared_mime),
            size_bytes: bytes.len() as u64,
        })
    }

    /// Turn a stored upload into its final served form. Images and generic
    /// files are done already; videos get one transcode attempt and fall
    /// back to the original on any failure.
    pub async fn process(&self, job: UploadJob) -> ProcessedUpload {
        if job.kind != MessageKind::Video {
            return ProcessedUpload {
                kind: job.kind,
                url: format!("/uploads/{}", job.stored_name),
                mime_type: job.declared_mime,
                size_bytes: job.size_bytes,
            };
        }

        match self.transcode_video(&job).await {
            TranscodeOutcome::Transcoded { url, size_bytes } => ProcessedUpload {
                kind: MessageKind::Video,
                url,
                mime_type: "video/mp4".to_string(),
                size_bytes,
            },
            TranscodeOutcome::FallbackToOriginal {
                url,
                size_bytes,
                reason,
            } => {
                tracing::warn!(
                    stored_name = %job.stored_name,
                    %reason,
                    "transcode failed, serving the original upload"
                );
                ProcessedUpload {
                    kind: MessageKind::Video,
                    url,
                    mime_type: job.declared_mime,
                    size_bytes,
                }
            }
        }
    }

    async fn transcode_video(&self, job: &UploadJob) -> TranscodeOutcome {
        let fallback = |reason: String| TranscodeOutcome::FallbackToOriginal {
            url: format!("/uploads/{}", job.stored_name),
            size_bytes: job.size_bytes,
            reason,
        };

        let _permit = match self.transcode_slots.acquire().await {
            Ok(permit) => permit,
            Err(_) => return fallback("transcode pool closed".to_string()),
        };

        let stem = job
            .stored_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&job.stored_name);
        let output_name = format!("{stem}_compressed_{}.mp4", Utc::now().timestamp_millis());
        let input = self.uploads_dir.join(&job.stored_name);
        let output = self.videos_dir.join(&output_name);

        tracing::debug!(stored_name = %job.stored_name, output = %output_name, "transcoding video");

        if let Err(err) = self.transcoder.transcode(&input, &output).await {
            // Drop any partial output so the videos dir only holds
            // playable files.
            let _ = tokio::fs::remove_file(&output).await;
            return fallback(err.to_string());
        }

        let size_bytes = match tokio::fs::metadata(&output).await {
            Ok(meta) if meta.len() > 0 => meta.len(),
            Ok(_) => {
                let _ = tokio::fs::remove_file(&output).await;
                return fallback("transcoder produced an empty file".to_string());
            }
            Err(err) => return fallback(format!("transcoded output missing: {err}")),
        };

        // The original is no longer needed once the re-encode exists.
        if let Err(err) = tokio::fs::remove_file(&input).await {
            tracing::warn!(?err, stored_name = %job.stored_name, "could not delete original video");
        }

        TranscodeOutcome::Transcoded {
            url: format!("/compressed_videos/{output_name}"),
            size_bytes,
        }
    }
}
