use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wavechat::config::Config;
use wavechat::gateway::fanout::ChatBroadcast;
use wavechat::media::pipeline::MediaPipeline;
use wavechat::media::transcode::FfmpegTranscoder;
use wavechat::state::RoomState;
use wavechat::AppState;

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing — env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    let broadcast = ChatBroadcast::new();
    let room = Arc::new(RoomState::new(broadcast.clone()));

    let transcoder = Arc::new(FfmpegTranscoder::new(config.ffmpeg_path.clone()));
    let media = MediaPipeline::new(
        config.uploads_dir.clone(),
        config.compressed_videos_dir.clone(),
        transcoder,
        config.max_concurrent_transcodes,
    )
    .await
    .expect("failed to create blob directories");

    tracing::info!(
        uploads_dir = %config.uploads_dir.display(),
        videos_dir = %config.compressed_videos_dir.display(),
        max_transcodes = config.max_concurrent_transcodes,
        "wavechat configured"
    );

    let state = AppState {
        config: Arc::new(config),
        broadcast,
        room,
        media: Arc::new(media),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = wavechat::routes::router(&state.config)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "wavechat listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
