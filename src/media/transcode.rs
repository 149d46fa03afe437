//! The external transcode tool, behind a trait so tests can substitute
//! failure or a canned success.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

/// Distribution profile for transcoded video: H.264 + AAC in MP4, 480px
/// tall with the aspect ratio preserved, 800k/128k bitrates.
const FFMPEG_ARGS: &[&str] = &[
    "-c:v", "libx264",
    "-c:a", "aac",
    "-vf", "scale=-2:480",
    "-b:v", "800k",
    "-b:a", "128k",
    "-f", "mp4",
];

/// Why a transcode attempt failed. Always recovered by falling back to the
/// original file; never surfaced to the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeError(pub String);

impl std::fmt::Display for TranscodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "transcode failed: {}", self.0)
    }
}

/// Result of the transcode step, consumed uniformly by the pipeline: either
/// the re-encoded output or the untouched original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscodeOutcome {
    Transcoded { url: String, size_bytes: u64 },
    FallbackToOriginal { url: String, size_bytes: u64, reason: String },
}

/// Boundary to the external re-encoding tool. Exactly one attempt per
/// upload; the caller decides what failure means.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}

/// Production transcoder: spawns `ffmpeg` as a child process per job.
pub struct FfmpegTranscoder {
    ffmpeg_path: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let child = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(FFMPEG_ARGS)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| TranscodeError(format!("failed to spawn ffmpeg: {err}")))?;

        let result = child
            .wait_with_output()
            .await
            .map_err(|err| TranscodeError(format!("ffmpeg did not finish: {err}")))?;

        if result.status.success() {
            return Ok(());
        }

        // ffmpeg prints its diagnosis on the last stderr lines.
        let stderr = String::from_utf8_lossy(&result.stderr);
        let detail = stderr.lines().last().unwrap_or("no stderr output");
        Err(TranscodeError(format!(
            "ffmpeg exited with {}: {detail}",
            result.status
        )))
    }
}
