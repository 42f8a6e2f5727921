mod action;
mod app;
mod app_state;
mod component;
mod components;
mod core;
mod focus;
mod http;
mod intent;
mod mpv;
mod router;
mod theme;
mod widgets;

use tokio::sync::{broadcast, mpsc};
use vibe_proto::catalog::Stores;

/// What PlayerCore broadcasts to the TUI.
#[derive(Debug, Clone)]
pub enum BroadcastMessage {
    /// The PlayerState changed; receivers fetch it from the StateManager.
    StateUpdated,
    /// A log line from the core event loop.
    Log(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = vibe_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("vibe.log");
    let ui_state_path = data_dir.join("ui_state.json");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG wins; the HTTP client internals are noisy at debug.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("vibe log: {}", log_path.display());

    tracing::info!("vibe starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match vibe_proto::config::Config::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("config load failed, using defaults: {}", e);
            vibe_proto::config::Config::default()
        }
    };

    // ── Catalog backend ──────────────────────────────────────────────────────
    let stores = Stores::from_config(&config)?;

    // ── Broadcast channel (PlayerCore → TUI) ────────────────────────────────
    let (broadcast_tx, broadcast_rx) = broadcast::channel::<BroadcastMessage>(1024);

    // ── PlayerEvent channel (TUI/HTTP → PlayerCore) ─────────────────────────
    let (event_tx, event_rx) = mpsc::channel::<core::PlayerEvent>(1024);

    // ── Build PlayerCore ─────────────────────────────────────────────────────
    let player_core = core::PlayerCore::new(
        &config,
        stores.songs.clone(),
        broadcast_tx.clone(),
        event_tx.clone(),
    )
    .await;
    let state_manager = player_core.state_manager();

    // ── HTTP server ──────────────────────────────────────────────────────────
    if config.http.enabled {
        http::start_server(
            config.http.bind_address.clone(),
            config.http.port,
            state_manager.clone(),
            event_tx.clone(),
        );
    }

    // The broadcast channel only carries changes, so push one snapshot now.
    let _ = broadcast_tx.send(BroadcastMessage::StateUpdated);
    let _ = event_tx
        .send(core::PlayerEvent::Command(
            vibe_proto::protocol::Command::ReloadCatalog,
        ))
        .await;

    // ── Spawn PlayerCore event loop ──────────────────────────────────────────
    tokio::spawn(async move {
        if let Err(e) = player_core.run(event_rx).await {
            tracing::error!("PlayerCore exited with error: {}", e);
        }
    });

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(ui_state_path, config, stores, event_tx, state_manager);
    app.run(broadcast_rx).await?;

    Ok(())
}
