//! Local control API. Every write endpoint forwards a `Command` into the
//! player core; reads come straight from the state store.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use vibe_proto::protocol::{Command, PlayerState};
use vibe_proto::song::Song;
use vibe_proto::state::StateManager;

use crate::core::PlayerEvent;

#[derive(Clone)]
struct HttpState {
    state_manager: Arc<StateManager>,
    event_tx: mpsc::Sender<PlayerEvent>,
}

pub fn router(state_manager: Arc<StateManager>, event_tx: mpsc::Sender<PlayerEvent>) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/songs", get(get_songs))
        .route("/api/play/:id", post(play_song))
        .route("/api/toggle", post(toggle))
        .route("/api/stop", post(stop))
        .route("/api/next", post(next_song))
        .route("/api/prev", post(prev_song))
        .route("/api/random", post(random_song))
        .route("/api/seek/:secs", post(seek))
        .route("/api/like/:id", post(toggle_like))
        .route("/api/volume/:pct", post(set_volume))
        .route("/api/command", post(command))
        .layer(CorsLayer::permissive())
        .with_state(HttpState {
            state_manager,
            event_tx,
        })
}

pub fn start_server(
    bind_address: String,
    port: u16,
    state_manager: Arc<StateManager>,
    event_tx: mpsc::Sender<PlayerEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let app = router(state_manager, event_tx);

        let addr = format!("{}:{}", bind_address, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind HTTP server to {}: {}", addr, e);
                return;
            }
        };

        info!("HTTP API server listening on http://{}", addr);

        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    })
}

async fn forward(state: &HttpState, cmd: Command) -> StatusCode {
    info!("HTTP API: {:?}", cmd);
    if state.event_tx.send(PlayerEvent::Command(cmd)).await.is_err() {
        error!("Failed to forward command, player core is gone");
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    StatusCode::OK
}

async fn get_state(State(state): State<HttpState>) -> Json<PlayerState> {
    Json(state.state_manager.get_state().await)
}

async fn get_songs(State(state): State<HttpState>) -> Json<Vec<Song>> {
    Json(state.state_manager.get_state().await.songs)
}

async fn play_song(State(state): State<HttpState>, Path(id): Path<String>) -> StatusCode {
    forward(&state, Command::PlaySong { id }).await
}

async fn toggle(State(state): State<HttpState>) -> StatusCode {
    forward(&state, Command::TogglePause).await
}

async fn stop(State(state): State<HttpState>) -> StatusCode {
    forward(&state, Command::Stop).await
}

async fn next_song(State(state): State<HttpState>) -> StatusCode {
    forward(&state, Command::Next).await
}

async fn prev_song(State(state): State<HttpState>) -> StatusCode {
    forward(&state, Command::Prev).await
}

async fn random_song(State(state): State<HttpState>) -> StatusCode {
    forward(&state, Command::Random).await
}

async fn seek(State(state): State<HttpState>, Path(secs): Path<f64>) -> StatusCode {
    if !secs.is_finite() || secs < 0.0 {
        return StatusCode::BAD_REQUEST;
    }
    forward(&state, Command::SeekTo { seconds: secs }).await
}

async fn toggle_like(State(state): State<HttpState>, Path(id): Path<String>) -> StatusCode {
    forward(&state, Command::ToggleLike { id }).await
}

async fn set_volume(State(state): State<HttpState>, Path(pct): Path<i32>) -> StatusCode {
    let value = (pct as f32 / 100.0).clamp(0.0, 1.0);
    forward(&state, Command::Volume { value }).await
}

async fn command(State(state): State<HttpState>, Json(cmd): Json<Command>) -> StatusCode {
    forward(&state, cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct Harness {
        app: Router,
        rx: mpsc::Receiver<PlayerEvent>,
        state_manager: Arc<StateManager>,
        _dir: tempfile::TempDir,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let state_manager = Arc::new(StateManager::new(dir.path().join("state.json")));
        let (tx, rx) = mpsc::channel(8);
        Harness {
            app: router(state_manager.clone(), tx),
            rx,
            state_manager,
            _dir: dir,
        }
    }

    fn post_req(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn next_command(rx: &mut mpsc::Receiver<PlayerEvent>) -> Command {
        match rx.recv().await {
            Some(PlayerEvent::Command(cmd)) => cmd,
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_play_forwards_song_id() {
        let mut h = harness();
        let resp = h.app.oneshot(post_req("/api/play/42")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            next_command(&mut h.rx).await,
            Command::PlaySong { id: "42".into() }
        );
    }

    #[tokio::test]
    async fn test_volume_is_clamped_percent() {
        let mut h = harness();
        let resp = h.app.oneshot(post_req("/api/volume/150")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(next_command(&mut h.rx).await, Command::Volume { value: 1.0 });
    }

    #[tokio::test]
    async fn test_seek_rejects_negative() {
        let h = harness();
        let resp = h.app.oneshot(post_req("/api/seek/-3")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_json_command_endpoint() {
        let mut h = harness();
        let req = Request::builder()
            .method("POST")
            .uri("/api/command")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"cmd":"SeekRelative","seconds":-10.0}"#))
            .unwrap();
        let resp = h.app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            next_command(&mut h.rx).await,
            Command::SeekRelative { seconds: -10.0 }
        );
    }

    #[tokio::test]
    async fn test_songs_lists_catalog() {
        let h = harness();
        h.state_manager
            .set_catalog(vec![
                Song {
                    id: "1".into(),
                    title: "Ventania".into(),
                    ..Default::default()
                },
                Song {
                    id: "2".into(),
                    title: "Maré".into(),
                    ..Default::default()
                },
            ])
            .await;
        let req = Request::builder()
            .uri("/api/songs")
            .body(Body::empty())
            .unwrap();
        let resp = h.app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let songs: Vec<Song> = serde_json::from_slice(&body).unwrap();
        assert_eq!(songs.len(), 2);
    }

    #[tokio::test]
    async fn test_closed_core_is_server_error() {
        let h = harness();
        drop(h.rx);
        let resp = h.app.oneshot(post_req("/api/next")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
