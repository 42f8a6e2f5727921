//! PlayerCore: single-owner event loop for all playback state.
//!
//! The TUI, the HTTP API and background tasks send `PlayerEvent`s into this
//! loop. PlayerCore alone mutates the `StateManager` and talks to mpv; after
//! every mutation it broadcasts `BroadcastMessage::StateUpdated`.
//!
//! Status is derived from mpv's pushed properties (`core-idle`, `pause`,
//! `time-pos`, `duration`). The 10-second heartbeat only checks process
//! liveness and the no-audio timeout.
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use vibe_proto::catalog::SongStore;
use vibe_proto::config::Config;
use vibe_proto::protocol::{CatalogStatus, Command, MpvHealth, PlaybackStatus, PlayerState};
use vibe_proto::song::Song;
use vibe_proto::state::StateManager;

use crate::mpv::{
    MpvDriver, MpvEvent, MpvHandle, EVENT_IPC_CLOSED, OBS_CORE_IDLE, OBS_DURATION, OBS_PAUSE,
    OBS_TIME_POS,
};
use crate::BroadcastMessage;

const HEARTBEAT: Duration = Duration::from_secs(10);
/// A load that produces no audio for this long is an error.
const LOAD_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug)]
pub enum PlayerEvent {
    /// From the TUI or the HTTP API.
    Command(Command),
    HeartbeatTick,
    /// Unsolicited mpv line, tagged with the connection it arrived on.
    Mpv { conn: u64, event: MpvEvent },
    /// Result of a background catalog fetch.
    CatalogLoaded(Result<Vec<Song>, String>),
    #[allow(dead_code)]
    Shutdown,
}

pub struct PlayerCore {
    state_manager: Arc<StateManager>,
    songs: Arc<dyn SongStore>,
    mpv_driver: MpvDriver,
    mpv_handle: Option<MpvHandle>,
    /// Bumped on every new mpv connection; events from older ones are dropped.
    mpv_conn: u64,
    event_tx: mpsc::Sender<PlayerEvent>,
    broadcast_tx: broadcast::Sender<BroadcastMessage>,
    /// mpv has the current song loaded (playing, paused or buffering).
    loaded: bool,
    mpv_health: MpvHealth,
    obs_core_idle: Option<bool>,
    obs_pause: bool,
    loading_since: Option<Instant>,
    last_status: PlaybackStatus,
    /// Position to seek to once mpv reports `file-loaded`.
    resume_at: Option<f64>,
}

impl PlayerCore {
    pub async fn new(
        config: &Config,
        songs: Arc<dyn SongStore>,
        broadcast_tx: broadcast::Sender<BroadcastMessage>,
        event_tx: mpsc::Sender<PlayerEvent>,
    ) -> Self {
        let state_manager = Arc::new(StateManager::new(config.player.state_file.clone()));
        let mut mpv_driver = MpvDriver::new(vibe_proto::platform::mpv_socket_name());
        mpv_driver.last_volume = state_manager.get_state().await.volume;

        Self {
            state_manager,
            songs,
            mpv_driver,
            mpv_handle: None,
            mpv_conn: 0,
            event_tx,
            broadcast_tx,
            loaded: false,
            mpv_health: MpvHealth::Absent,
            obs_core_idle: None,
            obs_pause: false,
            loading_since: None,
            last_status: PlaybackStatus::Idle,
            resume_at: None,
        }
    }

    pub fn state_manager(&self) -> Arc<StateManager> {
        Arc::clone(&self.state_manager)
    }

    /// Returns on `Shutdown` or when every sender is gone.
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<PlayerEvent>) -> anyhow::Result<()> {
        info!("PlayerCore: starting event loop");

        let heartbeat_tx = self.event_tx.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(HEARTBEAT).await;
                if heartbeat_tx.send(PlayerEvent::HeartbeatTick).await.is_err() {
                    break;
                }
            }
        });

        while let Some(evt) = event_rx.recv().await {
            if !self.handle_event(evt).await {
                break;
            }
        }
        info!("PlayerCore: event loop finished");

        self.cleanup().await;
        Ok(())
    }

    /// Process one event. Returns false when the loop should stop.
    pub async fn handle_event(&mut self, evt: PlayerEvent) -> bool {
        match evt {
            PlayerEvent::Shutdown => {
                info!("PlayerCore: shutdown requested");
                return false;
            }
            PlayerEvent::Command(cmd) => {
                info!("PlayerCore: command {:?}", cmd);
                if let Err(e) = self.handle_command(cmd).await {
                    error!("PlayerCore: command error: {:#}", e);
                    self.log(format!("command failed: {}", e));
                }
            }
            PlayerEvent::Mpv { conn, event } => {
                if conn == self.mpv_conn {
                    self.handle_mpv_event(event).await;
                } else {
                    debug!("PlayerCore: dropping event from stale mpv connection {}", conn);
                }
            }
            PlayerEvent::CatalogLoaded(result) => self.on_catalog_loaded(result).await,
            PlayerEvent::HeartbeatTick => {
                if self.mpv_handle.is_some() && self.mpv_driver.process_exited() {
                    warn!("PlayerCore: heartbeat: mpv process died");
                    self.on_mpv_lost().await;
                }
                if self.loaded && !self.obs_pause {
                    self.maybe_update_status().await;
                }
            }
        }
        true
    }

    fn notify(&self) {
        let _ = self.broadcast_tx.send(BroadcastMessage::StateUpdated);
    }

    /// Warn in the log file and surface the line in the TUI.
    fn log(&self, msg: String) {
        warn!("{}", msg);
        let _ = self.broadcast_tx.send(BroadcastMessage::Log(msg));
    }

    async fn set_status(&mut self, status: PlaybackStatus) {
        if status != self.last_status {
            info!("PlayerCore: status {:?} → {:?}", self.last_status, status);
            self.last_status = status;
            self.state_manager.set_playback_status(status).await;
            self.notify();
        }
    }

    // ── mpv events ────────────────────────────────────────────────────────────

    async fn handle_mpv_event(&mut self, evt: MpvEvent) {
        if let Some((obs_id, data)) = evt.as_property_change() {
            match obs_id {
                OBS_CORE_IDLE => {
                    let val = data.as_bool();
                    if val != self.obs_core_idle {
                        debug!("mpv: core-idle → {:?}", val);
                        self.obs_core_idle = val;
                        self.maybe_update_status().await;
                    }
                }
                OBS_PAUSE => {
                    let val = data.as_bool().unwrap_or(false);
                    if val != self.obs_pause {
                        debug!("mpv: pause → {}", val);
                        self.obs_pause = val;
                        self.maybe_update_status().await;
                    }
                }
                OBS_TIME_POS => {
                    if let Some(pos) = data.as_f64().filter(|_| self.loaded) {
                        self.state_manager.set_timeline(Some(pos), None).await;
                        self.notify();
                    }
                }
                OBS_DURATION => {
                    if let Some(d) = data.as_f64().filter(|_| self.loaded) {
                        self.state_manager.set_timeline(None, Some(d)).await;
                        self.notify();
                    }
                }
                _ => {}
            }
            return;
        }

        match evt.event_name() {
            Some("end-file") => {
                let reason = evt.end_reason().unwrap_or("unknown");
                info!("mpv: end-file reason={}", reason);
                // "stop" also fires when loadfile replaces the previous song
                match reason {
                    "eof" if self.loaded => {
                        self.loaded = false;
                        self.loading_since = None;
                        self.state_manager.set_ended().await;
                        self.last_status = PlaybackStatus::Ended;
                        self.notify();
                    }
                    "error" if self.loaded => {
                        self.loaded = false;
                        self.loading_since = None;
                        self.set_status(PlaybackStatus::Error).await;
                        self.log("mpv could not play the song".to_string());
                    }
                    _ => {}
                }
            }
            Some("start-file") => {
                self.obs_core_idle = Some(true);
                self.maybe_update_status().await;
            }
            Some("file-loaded") => {
                if let Some(pos) = self.resume_at.take() {
                    if let Some(h) = self.mpv_handle.as_ref() {
                        debug!("mpv: resuming at {:.1}s", pos);
                        if let Err(e) = h.seek_to(pos).await {
                            warn!("mpv: resume seek failed: {}", e);
                        }
                    }
                }
                // re-observe so mpv pushes the new file's values right away
                if let Some(h) = self.mpv_handle.clone() {
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        h.observe_all_properties().await;
                    });
                }
            }
            Some(EVENT_IPC_CLOSED) => {
                warn!("PlayerCore: mpv IPC connection closed");
                self.on_mpv_lost().await;
            }
            _ => {}
        }
    }

    /// Derive the status from observed properties while a song is loaded.
    async fn maybe_update_status(&mut self) {
        if !self.loaded {
            self.loading_since = None;
            return;
        }
        let status = if self.obs_pause {
            self.loading_since = None;
            PlaybackStatus::Paused
        } else if self.obs_core_idle == Some(false) {
            self.loading_since = None;
            PlaybackStatus::Playing
        } else {
            let since = *self.loading_since.get_or_insert_with(Instant::now);
            if since.elapsed() >= LOAD_TIMEOUT {
                warn!("mpv: no audio after {:?}, marking Error", since.elapsed());
                PlaybackStatus::Error
            } else {
                PlaybackStatus::Loading
            }
        };
        self.set_status(status).await;
    }

    fn reset_observed_state(&mut self) {
        self.obs_core_idle = None;
        self.obs_pause = false;
        self.loading_since = None;
    }

    async fn on_mpv_lost(&mut self) {
        self.mpv_handle = None;
        self.reset_observed_state();
        self.set_mpv_health(MpvHealth::Dead).await;
        if self.loaded {
            self.loaded = false;
            self.set_status(PlaybackStatus::Error).await;
            self.log("mpv stopped unexpectedly".to_string());
        }
    }

    // ── mpv handle management ─────────────────────────────────────────────────

    async fn set_mpv_health(&mut self, health: MpvHealth) {
        if self.mpv_health != health {
            info!("PlayerCore: mpv health {:?} → {:?}", self.mpv_health, health);
            self.mpv_health = health.clone();
            self.state_manager.set_mpv_health(health).await;
            self.notify();
        }
    }

    /// Install a connected handle and start observing properties.
    fn attach(&mut self, handle: MpvHandle) {
        let h = handle.clone();
        tokio::spawn(async move { h.observe_all_properties().await });
        self.mpv_handle = Some(handle);
    }

    /// Forward one connection's events into the loop, tagged with `conn`.
    fn event_forwarder(&self, conn: u64) -> mpsc::Sender<MpvEvent> {
        let (tx, mut rx) = mpsc::channel::<MpvEvent>(64);
        let core_tx = self.event_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if core_tx.send(PlayerEvent::Mpv { conn, event }).await.is_err() {
                    break;
                }
            }
        });
        tx
    }

    async fn ensure_mpv_handle(&mut self) -> Option<MpvHandle> {
        if self.mpv_handle.is_some() && self.mpv_driver.process_exited() {
            warn!("PlayerCore: mpv process died, dropping handle");
            self.on_mpv_lost().await;
        }

        if self.mpv_handle.is_none() {
            self.mpv_conn += 1;
            let event_tx = self.event_forwarder(self.mpv_conn);

            let handle = match self.mpv_driver.try_reconnect(event_tx.clone()).await {
                Some(h) => h,
                None => {
                    let restarting = matches!(self.mpv_health, MpvHealth::Dead);
                    self.set_mpv_health(if restarting {
                        MpvHealth::Restarting
                    } else {
                        MpvHealth::Starting
                    })
                    .await;
                    match self.mpv_driver.spawn_and_connect(event_tx).await {
                        Ok(h) => h,
                        Err(e) => {
                            self.log(format!("failed to start mpv: {}", e));
                            self.set_mpv_health(MpvHealth::Dead).await;
                            return None;
                        }
                    }
                }
            };

            self.set_mpv_health(MpvHealth::Running).await;
            self.attach(handle);
        }

        self.mpv_handle.clone()
    }

    // ── commands ──────────────────────────────────────────────────────────────

    async fn handle_command(&mut self, cmd: Command) -> anyhow::Result<()> {
        match cmd {
            Command::PlaySong { id } => self.play_song(&id).await?,
            Command::TogglePause => self.toggle_pause().await?,
            Command::SeekTo { seconds } => self.seek_to(seconds).await?,
            Command::SeekRelative { seconds } => {
                let progress = self.state_manager.get_state().await.progress_secs;
                self.seek_to(progress + seconds).await?
            }
            Command::Stop => self.stop().await?,
            Command::Next => {
                let song = self.state_manager.next_song().await;
                self.play_picked(song).await?
            }
            Command::Prev => {
                let song = self.state_manager.prev_song().await;
                self.play_picked(song).await?
            }
            Command::Random => {
                let song = self.state_manager.random_song().await;
                self.play_picked(song).await?
            }
            Command::Volume { value } => self.set_volume(value).await?,
            Command::ToggleLike { id } => {
                let liked = self.state_manager.toggle_like(&id).await?;
                debug!(id = %id, liked, "like toggled");
                self.notify();
            }
            Command::ReloadCatalog => self.reload_catalog().await,
            Command::GetState => self.notify(),
        }
        Ok(())
    }

    async fn play_song(&mut self, id: &str) -> anyhow::Result<()> {
        let state = self.state_manager.get_state().await;
        // only the current song may be missing from the catalog
        let song = state
            .find_song(id)
            .or_else(|| state.current_song.as_ref().filter(|s| s.id == id))
            .cloned();
        let Some(song) = song else {
            self.log(format!("song {} is not in the catalog", id));
            return Ok(());
        };

        let active = matches!(
            state.playback_status,
            PlaybackStatus::Playing | PlaybackStatus::Paused | PlaybackStatus::Loading
        );
        if state.is_current(id) && active && self.loaded {
            return self.toggle_pause().await;
        }
        let start = if state.is_current(id) {
            resume_position(&state)
        } else {
            0.0
        };
        self.load_song(song, state.volume, start).await
    }

    async fn play_picked(&mut self, song: Option<Song>) -> anyhow::Result<()> {
        match song {
            Some(song) => {
                let volume = self.state_manager.get_state().await.volume;
                self.load_song(song, volume, 0.0).await
            }
            None => {
                self.log("the catalog is empty".to_string());
                Ok(())
            }
        }
    }

    /// Hand `song` to mpv, starting at `start` seconds.
    async fn load_song(&mut self, song: Song, volume: f32, start: f64) -> anyhow::Result<()> {
        info!(id = %song.id, title = %song.title, start, "loading song");
        self.reset_observed_state();
        let url = song.audio_url.clone().filter(|u| !u.trim().is_empty());
        let title = song.title.clone();

        self.state_manager.set_loading(song).await?;
        self.resume_at = None;
        if start > 0.0 {
            self.resume_at = Some(self.state_manager.set_progress(start).await);
        }
        self.last_status = PlaybackStatus::Loading;
        self.notify();

        let Some(url) = url else {
            self.loaded = false;
            self.set_status(PlaybackStatus::Error).await;
            self.log(format!("\"{}\" has no audio", title));
            return Ok(());
        };

        self.loaded = true;
        self.loading_since = Some(Instant::now());
        let loaded = match self.ensure_mpv_handle().await {
            Some(handle) => handle.load(&url, volume).await,
            None => Err(anyhow::anyhow!("mpv is not available")),
        };
        if let Err(e) = loaded {
            self.loaded = false;
            self.set_status(PlaybackStatus::Error).await;
            self.log(format!("failed to play \"{}\": {}", title, e));
        }
        Ok(())
    }

    async fn toggle_pause(&mut self) -> anyhow::Result<()> {
        let state = self.state_manager.get_state().await;
        let Some(song) = state.current_song.clone() else {
            return Ok(());
        };
        match self.mpv_handle.as_ref().filter(|_| self.loaded) {
            // observed pause state avoids an IPC round-trip while buffering
            Some(handle) => handle.set_pause(!self.obs_pause).await?,
            // ended, stopped by an error or restored from the last session
            None => {
                let start = resume_position(&state);
                self.load_song(song, state.volume, start).await?
            }
        }
        Ok(())
    }

    async fn seek_to(&mut self, seconds: f64) -> anyhow::Result<()> {
        let state = self.state_manager.get_state().await;
        if state.current_song.is_none() {
            debug!("seek ignored: no current song");
            return Ok(());
        }
        let target = self.state_manager.set_progress(seconds).await;
        self.notify();
        // not loaded: the next play resumes from the stored position
        match self.mpv_handle.as_ref().filter(|_| self.loaded) {
            Some(handle) => handle.seek_to(target).await?,
            None => debug!("seek to {:.1}s stored until the song is reloaded", target),
        }
        Ok(())
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        info!("stopping playback");
        self.loaded = false;
        self.resume_at = None;
        self.reset_observed_state();
        if let Some(handle) = self.mpv_handle.as_ref() {
            handle.stop().await?;
        }
        self.state_manager.set_stopped().await?;
        self.last_status = PlaybackStatus::Idle;
        self.notify();
        Ok(())
    }

    async fn set_volume(&mut self, value: f32) -> anyhow::Result<()> {
        let value = value.clamp(0.0, 1.0);
        self.state_manager.set_volume(value).await?;
        self.mpv_driver.last_volume = value;
        if let Some(handle) = self.mpv_handle.as_ref() {
            handle.set_volume(value).await?;
        }
        self.notify();
        Ok(())
    }

    async fn reload_catalog(&mut self) {
        self.state_manager
            .set_catalog_status(CatalogStatus::Loading)
            .await;
        self.notify();

        let songs = Arc::clone(&self.songs);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = songs.list_songs().await.map_err(|e| e.to_string());
            let _ = tx.send(PlayerEvent::CatalogLoaded(result)).await;
        });
    }

    async fn on_catalog_loaded(&mut self, result: Result<Vec<Song>, String>) {
        match result {
            Ok(songs) => {
                info!(count = songs.len(), "catalog loaded");
                self.state_manager.set_catalog(songs).await;
                self.notify();
            }
            Err(e) => {
                self.state_manager
                    .set_catalog_status(CatalogStatus::Failed(e.clone()))
                    .await;
                self.notify();
                self.log(format!("could not load songs: {}", e));
            }
        }
    }

    async fn cleanup(&mut self) {
        info!("PlayerCore: cleanup, stopping mpv");
        if let Some(handle) = self.mpv_handle.take() {
            let _ = handle.stop().await;
        }
        self.mpv_driver.kill().await;
    }
}

/// Where a reloaded current song starts: the stored playhead, unless it
/// sits at the end.
fn resume_position(state: &PlayerState) -> f64 {
    let pos = state.progress_secs;
    let before_end = state.duration_secs.map_or(true, |d| pos < d);
    if pos > 0.0 && before_end {
        pos
    } else {
        0.0
    }
}
