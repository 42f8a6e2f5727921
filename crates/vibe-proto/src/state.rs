use crate::protocol::{CatalogStatus, MpvHealth, PlaybackStatus, PlayerState};
use crate::song::{sort_newest_first, Song};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The part of the player state that survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistentState {
    #[serde(default)]
    pub last_song_id: Option<String>,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub liked: Vec<String>,
}

fn default_volume() -> f32 {
    0.7
}

impl Default for PersistentState {
    fn default() -> Self {
        Self {
            last_song_id: None,
            volume: default_volume(),
            liked: Vec::new(),
        }
    }
}

pub struct StateManager {
    state: Arc<RwLock<PlayerState>>,
    state_file: PathBuf,
    /// Restored as the current song once the catalog arrives.
    pending_restore: std::sync::Mutex<Option<String>>,
}

impl StateManager {
    pub fn new(state_file: PathBuf) -> Self {
        let persistent = Self::load_persistent(&state_file);

        let state = PlayerState {
            rev: 1,
            volume: persistent.volume.clamp(0.0, 1.0),
            liked: persistent.liked,
            ..Default::default()
        };

        Self {
            state: Arc::new(RwLock::new(state)),
            state_file,
            pending_restore: std::sync::Mutex::new(persistent.last_song_id),
        }
    }

    pub fn arc(&self) -> Arc<RwLock<PlayerState>> {
        Arc::clone(&self.state)
    }

    pub async fn get_state(&self) -> PlayerState {
        self.state.read().await.clone()
    }

    /// Replace the catalog. The current song keeps playing even if it was
    /// removed; when it is still listed its record is refreshed.
    pub async fn set_catalog(&self, mut songs: Vec<Song>) {
        sort_newest_first(&mut songs);
        let restore = self
            .pending_restore
            .lock()
            .ok()
            .and_then(|mut pending| pending.take());

        let mut state = self.state.write().await;
        match state.current_song.as_ref().map(|s| s.id.clone()) {
            Some(id) => {
                if let Some(fresh) = songs.iter().find(|s| s.id == id) {
                    state.current_song = Some(fresh.clone());
                }
            }
            None => {
                state.current_song =
                    restore.and_then(|id| songs.iter().find(|s| s.id == id).cloned());
            }
        }
        state.songs = songs;
        state.catalog = CatalogStatus::Ready;
        state.rev += 1;
    }

    pub async fn set_catalog_status(&self, status: CatalogStatus) {
        let mut state = self.state.write().await;
        state.catalog = status;
        state.rev += 1;
    }

    /// A song was handed to mpv and becomes the current song.
    pub async fn set_loading(&self, song: Song) -> anyhow::Result<()> {
        {
            let mut state = self.state.write().await;
            state.current_song = Some(song);
            state.is_playing = true;
            state.playback_status = PlaybackStatus::Loading;
            state.progress_secs = 0.0;
            state.duration_secs = None;
            state.rev += 1;
        }
        self.save().await
    }

    pub async fn set_playback_status(&self, status: PlaybackStatus) {
        let mut state = self.state.write().await;
        state.is_playing = matches!(status, PlaybackStatus::Loading | PlaybackStatus::Playing);
        state.playback_status = status;
        state.rev += 1;
    }

    /// End of file: playback stops but the song stays current.
    pub async fn set_ended(&self) {
        let mut state = self.state.write().await;
        state.is_playing = false;
        state.playback_status = PlaybackStatus::Ended;
        if let Some(d) = state.duration_secs {
            state.progress_secs = d;
        }
        state.rev += 1;
    }

    pub async fn set_stopped(&self) -> anyhow::Result<()> {
        {
            let mut state = self.state.write().await;
            state.current_song = None;
            state.is_playing = false;
            state.playback_status = PlaybackStatus::Idle;
            state.progress_secs = 0.0;
            state.duration_secs = None;
            state.rev += 1;
        }
        self.save().await
    }

    pub async fn set_mpv_health(&self, health: MpvHealth) {
        let mut state = self.state.write().await;
        state.mpv_health = health;
        state.rev += 1;
    }

    pub async fn set_volume(&self, volume: f32) -> anyhow::Result<()> {
        {
            let mut state = self.state.write().await;
            state.volume = volume.clamp(0.0, 1.0);
            state.rev += 1;
        }
        self.save().await
    }

    pub async fn set_timeline(&self, progress_secs: Option<f64>, duration_secs: Option<f64>) {
        let mut state = self.state.write().await;
        if let Some(p) = progress_secs.filter(|p| p.is_finite()) {
            state.progress_secs = p.max(0.0);
        }
        if duration_secs.is_some() {
            state.duration_secs = duration_secs.filter(|d| d.is_finite() && *d > 0.0);
        }
        state.rev += 1;
    }

    /// Move the playhead. Clamped to the known duration.
    pub async fn set_progress(&self, secs: f64) -> f64 {
        let mut state = self.state.write().await;
        let upper = state.duration_secs.unwrap_or(f64::MAX);
        let clamped = if secs.is_finite() {
            secs.clamp(0.0, upper)
        } else {
            0.0
        };
        state.progress_secs = clamped;
        state.rev += 1;
        clamped
    }

    /// Add the id when absent, remove it when present. Returns whether the
    /// song is liked afterwards.
    pub async fn toggle_like(&self, id: &str) -> anyhow::Result<bool> {
        let liked = {
            let mut state = self.state.write().await;
            let liked = match state.liked.iter().position(|l| l == id) {
                Some(pos) => {
                    state.liked.remove(pos);
                    false
                }
                None => {
                    state.liked.push(id.to_string());
                    true
                }
            };
            state.rev += 1;
            liked
        };
        self.save().await?;
        Ok(liked)
    }

    /// The song after the current one in catalog order, wrapping around.
    /// With nothing current, the first song.
    pub async fn next_song(&self) -> Option<Song> {
        let state = self.state.read().await;
        let len = state.songs.len();
        if len == 0 {
            return None;
        }
        let idx = match state.current_id().and_then(|id| state.index_of(id)) {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        state.songs.get(idx).cloned()
    }

    pub async fn prev_song(&self) -> Option<Song> {
        let state = self.state.read().await;
        let len = state.songs.len();
        if len == 0 {
            return None;
        }
        let idx = match state.current_id().and_then(|id| state.index_of(id)) {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.songs.get(idx).cloned()
    }

    /// A random song, avoiding the current one when there is a choice.
    pub async fn random_song(&self) -> Option<Song> {
        use rand::seq::SliceRandom;

        let state = self.state.read().await;
        let current = state.current_id();
        let candidates: Vec<&Song> = if state.songs.len() > 1 {
            state
                .songs
                .iter()
                .filter(|s| Some(s.id.as_str()) != current)
                .collect()
        } else {
            state.songs.iter().collect()
        };
        candidates
            .choose(&mut rand::thread_rng())
            .map(|s| (*s).clone())
    }

    async fn save(&self) -> anyhow::Result<()> {
        let persistent = {
            let state = self.state.read().await;
            PersistentState {
                last_song_id: state.current_id().map(str::to_string),
                volume: state.volume,
                liked: state.liked.clone(),
            }
        };

        if let Some(parent) = self.state_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&persistent)?;
        tokio::fs::write(&self.state_file, json).await?;
        Ok(())
    }

    fn load_persistent(state_file: &Path) -> PersistentState {
        std::fs::read_to_string(state_file)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn song(id: &str, day: u32) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {id}"),
            audio_url: Some(format!("https://cdn/{id}.mp3")),
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn manager(dir: &tempfile::TempDir) -> StateManager {
        StateManager::new(dir.path().join("state.json"))
    }

    #[tokio::test]
    async fn test_catalog_sorted_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let sm = manager(&dir);
        sm.set_catalog(vec![song("old", 1), song("new", 20), song("mid", 10)])
            .await;
        let state = sm.get_state().await;
        let ids: Vec<_> = state.songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);
        assert_eq!(state.catalog, CatalogStatus::Ready);
    }

    #[tokio::test]
    async fn test_loading_then_ended_keeps_current() {
        let dir = tempfile::tempdir().unwrap();
        let sm = manager(&dir);
        sm.set_loading(song("a", 1)).await.unwrap();
        let state = sm.get_state().await;
        assert!(state.is_playing);
        assert_eq!(state.playback_status, PlaybackStatus::Loading);

        sm.set_timeline(Some(10.0), Some(180.0)).await;
        sm.set_ended().await;
        let state = sm.get_state().await;
        assert!(!state.is_playing);
        assert_eq!(state.playback_status, PlaybackStatus::Ended);
        assert_eq!(state.current_id(), Some("a"));
        assert_eq!(state.progress_secs, 180.0);
    }

    #[tokio::test]
    async fn test_paused_is_not_playing() {
        let dir = tempfile::tempdir().unwrap();
        let sm = manager(&dir);
        sm.set_loading(song("a", 1)).await.unwrap();
        sm.set_playback_status(PlaybackStatus::Paused).await;
        assert!(!sm.get_state().await.is_playing);
        sm.set_playback_status(PlaybackStatus::Playing).await;
        assert!(sm.get_state().await.is_playing);
    }

    #[tokio::test]
    async fn test_toggle_like_round_trip_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let sm = manager(&dir);
        assert!(sm.toggle_like("a").await.unwrap());
        assert!(sm.toggle_like("b").await.unwrap());
        assert!(!sm.toggle_like("a").await.unwrap());
        assert_eq!(sm.get_state().await.liked, vec!["b".to_string()]);

        let reopened = manager(&dir);
        assert_eq!(reopened.get_state().await.liked, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_rev_increments() {
        let dir = tempfile::tempdir().unwrap();
        let sm = manager(&dir);
        let before = sm.get_state().await.rev;
        sm.set_catalog_status(CatalogStatus::Loading).await;
        sm.set_volume(2.0).await.unwrap();
        let state = sm.get_state().await;
        assert_eq!(state.rev, before + 2);
        assert_eq!(state.volume, 1.0);
    }

    #[tokio::test]
    async fn test_next_prev_wrap() {
        let dir = tempfile::tempdir().unwrap();
        let sm = manager(&dir);
        assert!(sm.next_song().await.is_none());

        sm.set_catalog(vec![song("c", 1), song("b", 2), song("a", 3)]).await;
        assert_eq!(sm.next_song().await.unwrap().id, "a");
        assert_eq!(sm.prev_song().await.unwrap().id, "c");

        sm.set_loading(song("c", 1)).await.unwrap();
        assert_eq!(sm.next_song().await.unwrap().id, "a");
        assert_eq!(sm.prev_song().await.unwrap().id, "b");
    }

    #[tokio::test]
    async fn test_random_avoids_current() {
        let dir = tempfile::tempdir().unwrap();
        let sm = manager(&dir);
        sm.set_catalog(vec![song("a", 1), song("b", 2)]).await;
        sm.set_loading(song("a", 1)).await.unwrap();
        for _ in 0..10 {
            assert_eq!(sm.random_song().await.unwrap().id, "b");
        }
    }

    #[tokio::test]
    async fn test_seek_clamps_to_duration() {
        let dir = tempfile::tempdir().unwrap();
        let sm = manager(&dir);
        sm.set_loading(song("a", 1)).await.unwrap();
        sm.set_timeline(None, Some(100.0)).await;
        assert_eq!(sm.set_progress(250.0).await, 100.0);
        assert_eq!(sm.set_progress(-5.0).await, 0.0);
    }

    #[tokio::test]
    async fn test_last_song_restored_when_catalog_arrives() {
        let dir = tempfile::tempdir().unwrap();
        {
            let sm = manager(&dir);
            sm.set_loading(song("b", 2)).await.unwrap();
        }
        let sm = manager(&dir);
        assert!(sm.get_state().await.current_song.is_none());
        sm.set_catalog(vec![song("a", 1), song("b", 2)]).await;
        let state = sm.get_state().await;
        assert_eq!(state.current_id(), Some("b"));
        assert!(!state.is_playing);
        assert_eq!(state.playback_status, PlaybackStatus::Idle);
    }

    #[tokio::test]
    async fn test_removed_current_song_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let sm = manager(&dir);
        sm.set_catalog(vec![song("a", 1)]).await;
        sm.set_loading(song("a", 1)).await.unwrap();
        sm.set_catalog(vec![song("z", 5)]).await;
        let state = sm.get_state().await;
        assert_eq!(state.current_id(), Some("a"));
        assert!(state.find_song("a").is_none());
        assert_eq!(state.resolve_song("a").map(|s| s.id.as_str()), Some("a"));
    }

    #[test]
    fn test_corrupt_state_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let persistent = StateManager::load_persistent(&path);
        assert!(persistent.liked.is_empty());
        assert_eq!(persistent.volume, 0.7);
    }
}
