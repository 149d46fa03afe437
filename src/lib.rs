pub mod config;
pub mod error;
pub mod gateway;
pub mod media;
pub mod message;
pub mod routes;
pub mod state;

use std::sync::Arc;

use config::Config;
use gateway::fanout::ChatBroadcast;
use media::pipeline::MediaPipeline;
use state::RoomState;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub broadcast: ChatBroadcast,
    pub room: Arc<RoomState>,
    pub media: Arc<MediaPipeline>,
}
