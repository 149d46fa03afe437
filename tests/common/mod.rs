#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tempfile::TempDir;
use tokio::time;
use tokio_tungstenite::tungstenite;

use wavechat::config::Config;
use wavechat::gateway::fanout::ChatBroadcast;
use wavechat::media::pipeline::MediaPipeline;
use wavechat::media::transcode::{FfmpegTranscoder, Transcoder};
use wavechat::state::RoomState;
use wavechat::AppState;

pub type WsClient =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// A running server on an ephemeral port, with its blob directories in a
/// temp dir that lives as long as this struct.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub tmp: TempDir,
}

impl TestServer {
    pub fn uploads_dir(&self) -> std::path::PathBuf {
        self.tmp.path().join("uploads")
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

/// Start a server wired to the real ffmpeg transcoder. Gateway tests never
/// reach the transcode step.
pub async fn spawn_server() -> TestServer {
    spawn_server_with(Arc::new(FfmpegTranscoder::new("ffmpeg"))).await
}

/// Start a server with an injected transcoder (failure and canned-success
/// doubles in the upload tests).
pub async fn spawn_server_with(transcoder: Arc<dyn Transcoder>) -> TestServer {
    let tmp = TempDir::new().expect("temp dir");
    let config = Config {
        port: 0,
        uploads_dir: tmp.path().join("uploads"),
        compressed_videos_dir: tmp.path().join("compressed_videos"),
        ffmpeg_path: "ffmpeg".into(),
        max_concurrent_transcodes: 2,
    };

    let broadcast = ChatBroadcast::new();
    let room = Arc::new(RoomState::new(broadcast.clone()));
    let media = Arc::new(
        MediaPipeline::new(
            config.uploads_dir.clone(),
            config.compressed_videos_dir.clone(),
            transcoder,
            config.max_concurrent_transcodes,
        )
        .await
        .expect("create blob dirs"),
    );

    let state = AppState {
        config: Arc::new(config),
        broadcast,
        room,
        media,
    };

    let app = wavechat::routes::router(&state.config).with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { addr, state, tmp }
}

/// Open a WebSocket connection to the relay.
pub async fn connect(addr: SocketAddr) -> WsClient {
    let url = format!("ws://{addr}/ws");
    let (ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws
}

/// Send one protocol frame: `{ "event": ..., "data": ... }`.
pub async fn send_event(ws: &mut WsClient, event: &str, data: serde_json::Value) {
    let frame = serde_json::json!({ "event": event, "data": data });
    ws.send(tungstenite::Message::Text(frame.to_string().into()))
        .await
        .expect("send frame");
}

/// Receive the next text frame as JSON, failing after a timeout.
pub async fn recv_event(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("ws read error");
        match msg {
            tungstenite::Message::Text(text) => {
                return serde_json::from_str(&text).expect("frame is JSON");
            }
            tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Join and consume the three frames every joiner receives: the roster,
/// the join announcement, and the history replay. Returns (roster, replay).
pub async fn join(ws: &mut WsClient, name: &str) -> (Vec<String>, serde_json::Value) {
    send_event(ws, "join", serde_json::json!(name)).await;

    let roster_frame = recv_event(ws).await;
    assert_eq!(roster_frame["event"], "online-users");
    let roster: Vec<String> = roster_frame["data"]
        .as_array()
        .expect("roster array")
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();

    let announcement = recv_event(ws).await;
    assert_eq!(announcement["event"], "chat");
    assert_eq!(announcement["data"]["type"], "system");
    assert_eq!(
        announcement["data"]["message"],
        format!("{name} has joined the chat.")
    );

    let history = recv_event(ws).await;
    assert_eq!(history["event"], "chat-history");

    (roster, history["data"].clone())
}
