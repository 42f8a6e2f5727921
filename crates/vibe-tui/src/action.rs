//! Action enum: all user-initiated intents and internal events.

use vibe_proto::catalog::submit::SongForm;
use vibe_proto::Song;

use crate::router::Route;
use crate::widgets::toast::Severity;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Welcome,
    Home,
    Music,
    SongDetail,
    Favorites,
    Bio,
    Admin,
    FloatingPlayer,
    BottomNav,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    /// Play by song id; the current song toggles pause instead.
    Play(String),
    TogglePause,
    Next,
    Prev,
    Random,
    Stop,
    Volume(f32),
    SeekRelative(f64),
    SeekTo(f64),
    ToggleLike(String),
    ReloadCatalog,

    // ── Navigation ───────────────────────────────────────────────────────────
    Navigate(Route),
    Back,
    /// Emitted by the App after the route changed.
    RouteChanged(Route),
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Text input ───────────────────────────────────────────────────────────
    OpenFilter,
    CloseFilter,
    BeginEdit,
    EndEdit,

    // ── Admin ────────────────────────────────────────────────────────────────
    AdminLogin { email: String, password: String },
    AdminLogout,
    SubmitSong { form: SongForm, editing: Option<Song> },
    DeleteSong(Song),
    /// A background submit or delete finished.
    AdminTaskDone { ok: bool },

    // ── UI ───────────────────────────────────────────────────────────────────
    ToggleHelp,
    ToggleKeys,
    CopyToClipboard(String),
    Toast(Severity, String),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Tick,
    Noop,
}
