use serde::{Deserialize, Serialize};

use crate::song::Song;

/// Commands accepted by the player core, from the UI or the HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd")]
pub enum Command {
    /// Play a song by id. Playing the current song toggles pause instead.
    PlaySong { id: String },
    TogglePause,
    SeekTo { seconds: f64 },
    SeekRelative { seconds: f64 },
    Stop,
    Next,
    Prev,
    Random,
    Volume { value: f32 },
    ToggleLike { id: String },
    ReloadCatalog,
    GetState,
}

/// Detailed playback status, reflecting what mpv actually reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle, // nothing loaded / explicitly stopped
    Loading, // loadfile sent, waiting for audio
    Playing,
    Paused,
    Ended, // reached end of file; song stays current
    Error,
}

impl PlaybackStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Loading => "loading",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Ended => "ended",
            PlaybackStatus::Error => "error",
        }
    }
}

/// Health of the mpv process as observed by the core.
///
/// Transitions:
///   Absent -> Starting -> Running -> Dead -> Restarting -> Starting ...
///   Running -> Degraded(reason) -> Running | Dead
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum MpvHealth {
    #[default]
    Absent,
    Starting,
    Running,
    /// Connected but IPC is slow or returning errors.
    Degraded(String),
    Dead,
    Restarting,
}

impl MpvHealth {
    /// Short label for the status bar badge (≤5 chars).
    pub fn badge_label(&self) -> Option<&str> {
        match self {
            MpvHealth::Absent => None,
            MpvHealth::Starting => Some("INIT"),
            MpvHealth::Running => None,
            MpvHealth::Degraded(_) => Some("DEGD"),
            MpvHealth::Dead => Some("DEAD"),
            MpvHealth::Restarting => Some("REST"),
        }
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(
            self,
            MpvHealth::Degraded(_) | MpvHealth::Dead | MpvHealth::Restarting
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub enum CatalogStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// Snapshot of the player. `rev` increments on every change so observers
/// can skip redundant redraws.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlayerState {
    #[serde(default)]
    pub rev: u64,
    /// Catalog, newest first.
    pub songs: Vec<Song>,
    #[serde(default)]
    pub catalog: CatalogStatus,
    pub current_song: Option<Song>,
    pub is_playing: bool,
    pub playback_status: PlaybackStatus,
    pub progress_secs: f64,
    pub duration_secs: Option<f64>,
    pub volume: f32,
    /// Liked song ids in the order they were liked.
    #[serde(default)]
    pub liked: Vec<String>,
    #[serde(default)]
    pub mpv_health: MpvHealth,
}

impl PlayerState {
    pub fn find_song(&self, id: &str) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == id)
    }

    /// Catalog entry by id, falling back to the current song when the id is
    /// not in the catalog.
    pub fn resolve_song(&self, id: &str) -> Option<&Song> {
        self.find_song(id).or(self.current_song.as_ref())
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_song.as_ref().map(|s| s.id.as_str())
    }

    pub fn is_current(&self, id: &str) -> bool {
        self.current_id() == Some(id)
    }

    pub fn is_song_playing(&self, id: &str) -> bool {
        self.is_playing && self.is_current(id)
    }

    pub fn is_liked(&self, id: &str) -> bool {
        self.liked.iter().any(|l| l == id)
    }

    /// Liked songs present in the catalog, in like order.
    pub fn liked_songs(&self) -> Vec<&Song> {
        self.liked
            .iter()
            .filter_map(|id| self.find_song(id))
            .collect()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.songs.iter().position(|s| s.id == id)
    }

    /// Fraction of the current song played, `0.0..=1.0`.
    pub fn progress_ratio(&self) -> f64 {
        match self.duration_secs {
            Some(d) if d > 0.0 && d.is_finite() => (self.progress_secs / d).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {id}"),
            ..Default::default()
        }
    }

    #[test]
    fn test_command_wire_format() {
        let json = serde_json::to_string(&Command::PlaySong { id: "7".into() }).unwrap();
        assert_eq!(json, r#"{"cmd":"PlaySong","id":"7"}"#);
        let cmd: Command = serde_json::from_str(r#"{"cmd":"SeekTo","seconds":12.5}"#).unwrap();
        assert_eq!(cmd, Command::SeekTo { seconds: 12.5 });
    }

    #[test]
    fn test_resolve_song_falls_back_to_current() {
        let state = PlayerState {
            songs: vec![song("a"), song("b")],
            current_song: Some(song("gone")),
            ..Default::default()
        };
        assert_eq!(state.resolve_song("b").map(|s| s.id.as_str()), Some("b"));
        assert_eq!(state.resolve_song("gone").map(|s| s.id.as_str()), Some("gone"));
        assert_eq!(state.resolve_song("zzz").map(|s| s.id.as_str()), Some("gone"));

        let empty = PlayerState::default();
        assert!(empty.resolve_song("a").is_none());
    }

    #[test]
    fn test_liked_songs_keep_like_order_and_skip_missing() {
        let state = PlayerState {
            songs: vec![song("a"), song("b"), song("c")],
            liked: vec!["c".into(), "deleted".into(), "a".into()],
            ..Default::default()
        };
        let ids: Vec<_> = state.liked_songs().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["c", "a"]);
        assert!(state.is_liked("deleted"));
    }

    #[test]
    fn test_is_song_playing() {
        let mut state = PlayerState {
            current_song: Some(song("a")),
            is_playing: true,
            ..Default::default()
        };
        assert!(state.is_song_playing("a"));
        assert!(!state.is_song_playing("b"));
        state.is_playing = false;
        assert!(!state.is_song_playing("a"));
        assert!(state.is_current("a"));
    }

    #[test]
    fn test_progress_ratio() {
        let mut state = PlayerState {
            progress_secs: 30.0,
            duration_secs: Some(120.0),
            ..Default::default()
        };
        assert!((state.progress_ratio() - 0.25).abs() < f64::EPSILON);
        state.duration_secs = None;
        assert_eq!(state.progress_ratio(), 0.0);
        state.duration_secs = Some(10.0);
        assert_eq!(state.progress_ratio(), 1.0);
    }

    #[test]
    fn test_health_badges() {
        assert_eq!(MpvHealth::Running.badge_label(), None);
        assert_eq!(MpvHealth::Dead.badge_label(), Some("DEAD"));
        assert!(MpvHealth::Degraded("slow".into()).is_unhealthy());
        assert!(!MpvHealth::Starting.is_unhealthy());
    }
}
