use std::path::PathBuf;

/// Server configuration, loaded from environment variables. Every knob has
/// a default so the relay runs out of the box.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP/WebSocket server binds to.
    pub port: u16,
    /// Directory for original uploads and generic files.
    pub uploads_dir: PathBuf,
    /// Directory for transcoded video output.
    pub compressed_videos_dir: PathBuf,
    /// Path to the ffmpeg binary; bare `ffmpeg` resolves via PATH.
    pub ffmpeg_path: PathBuf,
    /// Maximum simultaneously running transcode processes.
    pub max_concurrent_transcodes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: var_or("PORT", 5000),
            uploads_dir: PathBuf::from(var_or("UPLOADS_DIR", "uploads".to_string())),
            compressed_videos_dir: PathBuf::from(var_or(
                "COMPRESSED_VIDEOS_DIR",
                "compressed_videos".to_string(),
            )),
            ffmpeg_path: PathBuf::from(var_or("FFMPEG_PATH", "ffmpeg".to_string())),
            max_concurrent_transcodes: var_or("MAX_CONCURRENT_TRANSCODES", 2),
        }
    }
}

fn var_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
