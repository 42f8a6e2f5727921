//! AppState: shared read-only data passed to all components during render
//! and event handling. Only the App event loop writes to it.

use vibe_proto::config::ArtistConfig;
use vibe_proto::{PlayerState, Song};

use crate::intent::RenderHint;
use crate::router::{self, Route};
use crate::widgets::status_bar::InputMode;

pub struct AppState {
    // ── Player ──────────────────────────────────────────────────────────────
    /// Last snapshot broadcast by the player core.
    pub player: PlayerState,
    /// How to render the play/pause control while a toggle is in flight.
    pub pause_hint: RenderHint,

    // ── Routing ─────────────────────────────────────────────────────────────
    pub route: Route,
    pub can_go_back: bool,

    // ── Branding ────────────────────────────────────────────────────────────
    pub artist: ArtistConfig,

    // ── Admin session ───────────────────────────────────────────────────────
    /// Email of the logged-in admin.
    pub admin_user: Option<String>,
    pub login_enabled: bool,
    /// A submit or delete is running in the background.
    pub admin_busy: bool,

    // ── UI mode ─────────────────────────────────────────────────────────────
    pub input_mode: InputMode,
    /// WARN/ERROR lines forwarded from the player core.
    pub logs: Vec<String>,
}

impl AppState {
    pub fn new(artist: ArtistConfig, login_enabled: bool) -> Self {
        Self {
            player: PlayerState::default(),
            pause_hint: RenderHint::Normal,
            route: Route::Welcome,
            can_go_back: false,
            artist,
            admin_user: None,
            login_enabled,
            admin_busy: false,
            input_mode: InputMode::Normal,
            logs: Vec::new(),
        }
    }

    pub fn path(&self) -> String {
        self.route.path()
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.player.current_song.as_ref()
    }

    pub fn floating_player_visible(&self) -> bool {
        router::floating_player_visible(&self.path(), self.current_song().is_some())
    }

    pub fn bottom_nav_visible(&self) -> bool {
        router::bottom_nav_visible(&self.path())
    }

    pub fn is_admin(&self) -> bool {
        self.admin_user.is_some()
    }

    pub fn cover_for<'a>(&'a self, song: &'a Song) -> &'a str {
        song.cover_or(&self.artist.default_cover)
    }

    pub fn last_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str) -> Song {
        Song {
            id: id.to_string(),
            title: format!("Song {}", id),
            ..Default::default()
        }
    }

    #[test]
    fn test_chrome_visibility_tracks_route_and_current_song() {
        let mut state = AppState::new(ArtistConfig::default(), false);
        state.route = Route::Home;
        assert!(!state.floating_player_visible());
        assert!(state.bottom_nav_visible());

        state.player.current_song = Some(song("1"));
        assert!(state.floating_player_visible());

        state.route = Route::Song("1".into());
        assert!(!state.floating_player_visible());
        assert!(!state.bottom_nav_visible());
    }

    #[test]
    fn test_cover_falls_back_to_artist_picture() {
        let state = AppState::new(ArtistConfig::default(), false);
        let mut s = song("1");
        assert_eq!(state.cover_for(&s), state.artist.default_cover);
        s.cover = Some("https://cdn/c.jpg".into());
        assert_eq!(state.cover_for(&s), "https://cdn/c.jpg");
    }
}
