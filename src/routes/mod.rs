pub mod health;
pub mod upload;

use axum::Router;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::AppState;

pub fn router(config: &Config) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(upload::router())
        .merge(crate::gateway::server::router())
        // Processed blobs are plain static byte streams.
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .nest_service(
            "/compressed_videos",
            ServeDir::new(&config.compressed_videos_dir),
        )
}
