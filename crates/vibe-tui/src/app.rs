//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Commands to the player core flow out through `cmd_tx`.

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use vibe_proto::catalog::submit::{self, SongForm, SubmitContext, SubmitOutcome};
use vibe_proto::catalog::Stores;
use vibe_proto::config::Config;
use vibe_proto::protocol::{CatalogStatus, Command, MpvHealth, PlaybackStatus, PlayerState};
use vibe_proto::state::StateManager;
use vibe_proto::Song;

use crate::core::PlayerEvent;
use crate::BroadcastMessage;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        admin::Admin,
        bio::Bio,
        bottom_nav::BottomNav,
        floating_player::FloatingPlayer,
        help_overlay::HelpOverlay,
        song_detail::SongDetail,
        song_list::{ListKind, SongList},
        welcome::Welcome,
    },
    focus::{main_view_id, ring_for_route, FocusRing},
    intent::IntentState,
    router::{History, Route, NAV_ITEMS},
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        text_field::TextField,
        toast::{Severity, ToastManager},
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    StateUpdated(PlayerState),
    Log(String),
    /// A background submit or delete finished.
    AdminDone { ok: bool, message: String },
}

/// Widest the page column gets on large terminals.
const MAX_COLUMN_W: u16 = 84;
const MAX_LOG_LINES: usize = 500;
const VOLUME_STEP: f32 = 0.05;

// ── Persistence serde structs ─────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
#[serde(default)]
struct UiSessionState {
    /// Signed-in admin, re-validated against the config on startup.
    admin_email: Option<String>,
    hide_keys_bar: bool,
}

// ── Pane area tracking ────────────────────────────────────────────────────────

/// Last-drawn rects of the focusable panes, for mouse hit-testing.
#[derive(Default, Clone)]
struct PaneAreas {
    main: Rect,
    floating: Rect,
    nav: Rect,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    ui_state_path: PathBuf,
    config: Config,
    stores: Stores,

    // ── Channels ──────────────────────────────────────────────────────────────
    cmd_tx: mpsc::Sender<PlayerEvent>,
    state_manager: Arc<StateManager>,
    /// Set in `run()`; background tasks report back through it.
    msg_tx: Option<mpsc::Sender<AppMessage>>,

    // ── Shared state ──────────────────────────────────────────────────────────
    state: AppState,
    history: History,
    focus: FocusRing,

    // ── Components ────────────────────────────────────────────────────────────
    welcome: Welcome,
    home: SongList,
    music: SongList,
    favorites: SongList,
    song_detail: SongDetail,
    bio: Bio,
    admin: Admin,
    floating_player: FloatingPlayer,
    bottom_nav: BottomNav,
    help_overlay: HelpOverlay,

    // ── Chrome ────────────────────────────────────────────────────────────────
    toast: ToastManager,
    /// `:` path prompt, open while `input_mode == Command`.
    prompt: TextField,
    show_help: bool,
    show_keys_bar: bool,
    pane_areas: PaneAreas,

    // ── Intents & transitions ─────────────────────────────────────────────────
    intent_pause: IntentState<bool>,
    prev_mpv_health: MpvHealth,
    prev_catalog: CatalogStatus,
    prev_status: PlaybackStatus,

    should_quit: bool,
}

impl App {
    pub fn new(
        ui_state_path: PathBuf,
        config: Config,
        stores: Stores,
        cmd_tx: mpsc::Sender<PlayerEvent>,
        state_manager: Arc<StateManager>,
    ) -> Self {
        let session = load_ui_session_state(&ui_state_path);
        let mut state = AppState::new(config.artist.clone(), config.admin.login_enabled());
        // a stale session from other credentials does not sign anyone in
        state.admin_user = session.admin_email.filter(|email| {
            config.admin.login_enabled()
                && email.trim().eq_ignore_ascii_case(config.admin.email.trim())
        });

        let history = History::new(Route::Welcome);
        let focus = FocusRing::new(ring_for_route(history.current(), false));

        Self {
            ui_state_path,
            config,
            stores,
            cmd_tx,
            state_manager,
            msg_tx: None,
            state,
            history,
            focus,
            welcome: Welcome,
            home: SongList::new(ListKind::Home),
            music: SongList::new(ListKind::Music),
            favorites: SongList::new(ListKind::Favorites),
            song_detail: SongDetail::new(),
            bio: Bio::new(),
            admin: Admin::new(),
            floating_player: FloatingPlayer,
            bottom_nav: BottomNav::new(),
            help_overlay: HelpOverlay::new(),
            toast: ToastManager::new(),
            prompt: TextField::new("go to", "/music, /song/<id>, /admin"),
            show_help: false,
            show_keys_bar: !session.hide_keys_bar,
            pane_areas: PaneAreas::default(),
            intent_pause: IntentState::new(false),
            prev_mpv_health: MpvHealth::Absent,
            prev_catalog: CatalogStatus::Loading,
            prev_status: PlaybackStatus::Idle,
            should_quit: false,
        }
    }

    pub async fn run(
        mut self,
        mut broadcast_rx: broadcast::Receiver<BroadcastMessage>,
    ) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);
        self.msg_tx = Some(tx.clone());
        self.dispatch(Action::RouteChanged(self.history.current().clone()))
            .await;

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: broadcast receiver (PlayerCore → AppMessage) ────
        let bc_tx = tx.clone();
        let bc_state_manager = self.state_manager.clone();
        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(msg) => {
                        let app_msg = match msg {
                            BroadcastMessage::StateUpdated => {
                                AppMessage::StateUpdated(bc_state_manager.get_state().await)
                            }
                            BroadcastMessage::Log(s) => AppMessage::Log(s),
                        };
                        if bc_tx.send(app_msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("broadcast receiver lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        // ── Periodic timers ───────────────────────────────────────────────────
        // Toast expiry, spinner animation and intent timeouts.
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg).await;
                    // drain whatever queued up while we were busy
                    while let Ok(next) = rx.try_recv() {
                        needs_redraw |= self.handle_message(next).await;
                    }
                }

                _ = ui_tick.tick() => {
                    let tick_actions: Vec<Action> = {
                        let s = &self.state;
                        let mut all = Vec::new();
                        all.extend(self.admin.tick(s));
                        all.extend(self.song_detail.tick(s));
                        all
                    };
                    for action in tick_actions {
                        self.dispatch(action).await;
                    }
                    needs_redraw = true;
                }

                _ = toast_tick.tick() => {
                    self.toast.tick();
                    self.intent_pause.tick();
                    self.state.pause_hint = self.intent_pause.render_state();
                    needs_redraw = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.save_ui_session_state();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return false;
                    }
                    let actions = self.handle_key(key);
                    for a in actions {
                        self.dispatch(a).await;
                    }
                }
                Event::Mouse(mouse) => {
                    let actions = self.handle_mouse(mouse);
                    for a in actions {
                        self.dispatch(a).await;
                    }
                }
                Event::Resize(..) => {}
                _ => return false,
            },

            AppMessage::StateUpdated(player) => self.on_state_updated(player),

            AppMessage::Log(msg) => self.push_log(msg),

            AppMessage::AdminDone { ok, message } => {
                self.state.admin_busy = false;
                let severity = if ok { Severity::Success } else { Severity::Error };
                self.toast.resolve_spinner(severity, message);
                self.dispatch(Action::AdminTaskDone { ok }).await;
                if ok {
                    self.send_cmd(Command::ReloadCatalog).await;
                }
            }
        }
        true
    }

    fn on_state_updated(&mut self, player: PlayerState) {
        let had_current = self.state.current_song().is_some();
        self.state.player = player;

        // ── mpv health transition toasts ──────────────────────────────────────
        let new_health = self.state.player.mpv_health.clone();
        if new_health != self.prev_mpv_health {
            match &new_health {
                MpvHealth::Dead => self.toast.error("mpv process died"),
                MpvHealth::Restarting => self.toast.warning("mpv restarting..."),
                MpvHealth::Running if self.prev_mpv_health.is_unhealthy() => {
                    self.toast.success("mpv recovered")
                }
                MpvHealth::Degraded(reason) => {
                    self.toast.warning(format!("mpv degraded: {}", reason))
                }
                _ => {}
            }
            self.prev_mpv_health = new_health;
        }

        // ── Catalog transitions ───────────────────────────────────────────────
        let catalog = self.state.player.catalog.clone();
        if catalog != self.prev_catalog {
            match &catalog {
                CatalogStatus::Failed(e) => self.toast.error(format!("catalog: {}", e)),
                CatalogStatus::Ready if matches!(self.prev_catalog, CatalogStatus::Failed(_)) => {
                    self.toast.success("catalog loaded")
                }
                _ => {}
            }
            self.prev_catalog = catalog;
        }

        let status = self.state.player.playback_status;
        if status != self.prev_status {
            if status == PlaybackStatus::Error {
                let title = self
                    .state
                    .current_song()
                    .map(|s| s.title.clone())
                    .unwrap_or_default();
                self.toast.error(format!("could not play “{}”", title));
            }
            self.prev_status = status;
        }

        // ── Intent confirmation ───────────────────────────────────────────────
        self.intent_pause.on_confirmed(self.state.player.is_playing);
        self.state.pause_hint = self.intent_pause.render_state();

        // the floating player joins the focus ring once something is current
        if had_current != self.state.current_song().is_some() {
            self.rebuild_focus_ring();
        }
    }

    // ── Keyboard handling ─────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }

        match self.state.input_mode {
            InputMode::Command => return self.handle_prompt_key(key),
            // the admin form owns the keyboard
            InputMode::Form => return self.admin.handle_key(key, &self.state),
            InputMode::Filter | InputMode::Normal => {}
        }

        if self.state.input_mode == InputMode::Normal {
            match key.code {
                KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE && !self.show_help => {
                    return vec![Action::Quit];
                }
                KeyCode::Char('?') => return vec![Action::ToggleHelp],
                KeyCode::Char('K') => return vec![Action::ToggleKeys],
                _ => {}
            }
        }

        // Help overlay captures all keys when visible
        if self.show_help {
            let actions = self.help_overlay.handle_key(key, &self.state);
            if !actions.is_empty() {
                return actions;
            }
            return vec![Action::ToggleHelp];
        }

        let focused = self.focus.current();

        // Popups see every key first
        if let Some(id) = focused {
            if self.with_component(id, |c, _| c.has_modal()) {
                return self.with_component(id, |c, s| c.handle_key(key, s));
            }
        }

        // Tab / Shift-Tab always cycle focus (in filter mode, it closes filter first)
        match key.code {
            KeyCode::Tab => {
                if self.state.input_mode == InputMode::Filter {
                    return vec![Action::CloseFilter, Action::FocusNext];
                }
                return vec![Action::FocusNext];
            }
            KeyCode::BackTab => {
                if self.state.input_mode == InputMode::Filter {
                    return vec![Action::CloseFilter, Action::FocusPrev];
                }
                return vec![Action::FocusPrev];
            }
            _ => {}
        }

        // Global playback and navigation keys (Normal mode only)
        if self.state.input_mode == InputMode::Normal {
            let volume = self.state.player.volume;
            match key.code {
                KeyCode::Char(' ') => return vec![Action::TogglePause],
                KeyCode::Char('n') => return vec![Action::Next],
                KeyCode::Char('p') => return vec![Action::Prev],
                KeyCode::Char('r') => return vec![Action::Random],
                KeyCode::Char('s') => return vec![Action::Stop],
                KeyCode::Char('R') => return vec![Action::ReloadCatalog],
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    return vec![Action::Volume((volume + VOLUME_STEP).min(1.0))];
                }
                KeyCode::Char('-') => {
                    return vec![Action::Volume((volume - VOLUME_STEP).max(0.0))];
                }
                KeyCode::Char(',') => return vec![Action::SeekRelative(-10.0)],
                KeyCode::Char('.') => return vec![Action::SeekRelative(10.0)],
                KeyCode::Char('<') => return vec![Action::SeekRelative(-60.0)],
                KeyCode::Char('>') => return vec![Action::SeekRelative(60.0)],
                KeyCode::Char(c @ '1'..='4') => {
                    let idx = c as usize - '1' as usize;
                    if let Some(route) = NAV_ITEMS.get(idx).and_then(|it| Route::parse(it.path)) {
                        return vec![Action::Navigate(route)];
                    }
                }
                KeyCode::Char(':') => {
                    self.prompt.clear();
                    self.state.input_mode = InputMode::Command;
                    return vec![];
                }
                KeyCode::Esc | KeyCode::Backspace => return vec![Action::Back],
                _ => {}
            }
        }

        match focused {
            Some(id) => self.with_component(id, |c, s| c.handle_key(key, s)),
            None => vec![],
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Esc => {
                self.state.input_mode = InputMode::Normal;
                vec![]
            }
            KeyCode::Enter => {
                self.state.input_mode = InputMode::Normal;
                let path = self.prompt.value().trim().to_string();
                let path = if path.starts_with('/') {
                    path
                } else {
                    format!("/{}", path)
                };
                match Route::parse(&path) {
                    Some(route) => vec![Action::Navigate(route)],
                    None => vec![Action::Toast(
                        Severity::Warning,
                        format!("no such page: {}", path),
                    )],
                }
            }
            _ => {
                self.prompt.handle_key(key);
                vec![]
            }
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let is_click = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click || self.show_help || self.state.input_mode.is_text_entry() {
            return vec![];
        }

        let pos = Position::new(event.column, event.row);
        let areas = self.pane_areas.clone();
        let targets = [
            (main_view_id(&self.state.route), areas.main),
            (ComponentId::FloatingPlayer, areas.floating),
            (ComponentId::BottomNav, areas.nav),
        ];
        for (id, area) in targets {
            if area.area() == 0 || !area.contains(pos) {
                continue;
            }
            let mut actions = self.with_component(id, |c, s| c.handle_mouse(event, area, s));
            if self.focus.current() != Some(id) && matches!(event.kind, MouseEventKind::Down(_)) {
                actions.insert(0, Action::FocusPane(id));
            }
            return actions;
        }
        vec![]
    }

    // ── Component access ──────────────────────────────────────────────────────

    fn with_component<R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut dyn Component, &AppState) -> R,
    ) -> R {
        let s = &self.state;
        match id {
            ComponentId::Welcome => f(&mut self.welcome, s),
            ComponentId::Home => f(&mut self.home, s),
            ComponentId::Music => f(&mut self.music, s),
            ComponentId::SongDetail => f(&mut self.song_detail, s),
            ComponentId::Favorites => f(&mut self.favorites, s),
            ComponentId::Bio => f(&mut self.bio, s),
            ComponentId::Admin => f(&mut self.admin, s),
            ComponentId::FloatingPlayer => f(&mut self.floating_player, s),
            ComponentId::BottomNav => f(&mut self.bottom_nav, s),
            ComponentId::HelpOverlay => f(&mut self.help_overlay, s),
        }
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            // Broadcast action to all components first
            let secondary: Vec<Action> = {
                let s = &self.state;
                let all: [&mut dyn Component; 10] = [
                    &mut self.welcome,
                    &mut self.home,
                    &mut self.music,
                    &mut self.favorites,
                    &mut self.song_detail,
                    &mut self.bio,
                    &mut self.admin,
                    &mut self.floating_player,
                    &mut self.bottom_nav,
                    &mut self.help_overlay,
                ];
                all.into_iter()
                    .flat_map(|c| c.on_action(&action, s))
                    .collect()
            };

            let follow_up = self.apply_action(action).await;
            queue.extend(follow_up);
            queue.extend(secondary);
        }
    }

    /// Returns actions the change implies (e.g. `RouteChanged` after a
    /// navigation); `dispatch` runs them next.
    async fn apply_action(&mut self, action: Action) -> Vec<Action> {
        match &action {
            Action::Tick | Action::Noop => {}
            // never log passwords
            Action::AdminLogin { email, .. } => debug!("apply_action: AdminLogin({})", email),
            _ => debug!("apply_action: {:?}", action),
        }
        match action {
            // ── Playback ──────────────────────────────────────────────────────
            Action::Play(id) => {
                if self.state.player.is_current(&id) {
                    self.intent_pause.set_intent(!self.state.player.is_playing);
                }
                self.send_cmd(Command::PlaySong { id }).await;
            }
            Action::TogglePause => {
                if self.state.current_song().is_none() {
                    self.toast.info("nothing to play yet");
                    return vec![];
                }
                let currently_playing = self.state.player.is_playing;
                self.intent_pause.set_intent(!currently_playing);
                self.send_cmd(Command::TogglePause).await;
            }
            Action::Next => self.send_cmd(Command::Next).await,
            Action::Prev => self.send_cmd(Command::Prev).await,
            Action::Random => self.send_cmd(Command::Random).await,
            Action::Stop => self.send_cmd(Command::Stop).await,
            Action::Volume(v) => {
                self.send_cmd(Command::Volume {
                    value: v.clamp(0.0, 1.0),
                })
                .await
            }
            Action::SeekRelative(delta) => {
                self.send_cmd(Command::SeekRelative { seconds: delta }).await
            }
            Action::SeekTo(secs) => self.send_cmd(Command::SeekTo { seconds: secs }).await,
            Action::ToggleLike(id) => self.send_cmd(Command::ToggleLike { id }).await,
            Action::ReloadCatalog => {
                self.toast.info("reloading catalog…");
                self.send_cmd(Command::ReloadCatalog).await;
            }

            // ── Navigation ────────────────────────────────────────────────────
            Action::Navigate(route) => {
                self.history.push(route);
                return self.on_route_changed();
            }
            Action::Back => {
                if self.history.back() {
                    return self.on_route_changed();
                }
            }
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPrev => {
                self.focus.prev();
            }
            Action::FocusPane(id) => self.focus.set(id),

            // ── Text input ────────────────────────────────────────────────────
            Action::OpenFilter => self.state.input_mode = InputMode::Filter,
            Action::BeginEdit => self.state.input_mode = InputMode::Form,
            Action::CloseFilter | Action::EndEdit => self.state.input_mode = InputMode::Normal,

            // ── Admin ─────────────────────────────────────────────────────────
            Action::AdminLogin { email, password } => {
                if !self.config.admin.login_enabled() {
                    self.toast.warning("admin login is disabled");
                } else if self.config.admin.check(&email, &password) {
                    info!(email = %email, "admin signed in");
                    self.toast.success(format!("welcome, {}", email));
                    self.state.admin_user = Some(email);
                    self.save_ui_session_state();
                } else {
                    warn!(email = %email, "admin sign-in rejected");
                    self.toast.error("invalid credentials");
                }
            }
            Action::AdminLogout => {
                if let Some(email) = self.state.admin_user.take() {
                    info!(email = %email, "admin signed out");
                    self.toast.info("signed out");
                    self.save_ui_session_state();
                }
            }
            Action::SubmitSong { form, editing } => self.spawn_submit(form, editing),
            Action::DeleteSong(song) => self.spawn_delete(song),

            // ── UI toggles ────────────────────────────────────────────────────
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::ToggleKeys => {
                self.show_keys_bar = !self.show_keys_bar;
                self.save_ui_session_state();
            }
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let display = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text.clone()
                        };
                        self.toast.success(format!("copied: {}", display));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }
            Action::Toast(severity, message) => self.toast.push(severity, message),

            // ── System ────────────────────────────────────────────────────────
            Action::Quit => self.should_quit = true,

            // Handled at component level / no-op here
            Action::RouteChanged(_) | Action::AdminTaskDone { .. } | Action::Tick | Action::Noop => {}
        }
        vec![]
    }

    fn on_route_changed(&mut self) -> Vec<Action> {
        let route = self.history.current().clone();
        info!(path = %route.path(), "navigate");
        let mut actions = Vec::new();
        if self.state.input_mode == InputMode::Filter {
            actions.push(Action::CloseFilter);
        }
        self.state.route = route.clone();
        self.state.can_go_back = self.history.depth() > 1;
        self.rebuild_focus_ring();
        self.focus.set(main_view_id(&route));
        actions.push(Action::RouteChanged(route));
        actions
    }

    fn rebuild_focus_ring(&mut self) {
        let ring = ring_for_route(&self.state.route, self.state.current_song().is_some());
        self.focus.set_items(ring);
    }

    // ── Admin background work ─────────────────────────────────────────────────

    fn admin_task_allowed(&mut self) -> bool {
        if !self.state.is_admin() {
            self.toast.error("sign in first");
            return false;
        }
        if self.state.admin_busy {
            self.toast.warning("still saving…");
            return false;
        }
        self.msg_tx.is_some()
    }

    fn spawn_submit(&mut self, form: SongForm, editing: Option<Song>) {
        if !self.admin_task_allowed() {
            return;
        }
        let Some(tx) = self.msg_tx.clone() else {
            return;
        };
        self.state.admin_busy = true;
        self.toast.spinner(if editing.is_some() {
            "saving changes…"
        } else {
            "publishing…"
        });

        let stores = self.stores.clone();
        let author = self.state.artist.name.clone();
        let default_cover = self.state.artist.default_cover.clone();
        tokio::spawn(async move {
            let ctx = SubmitContext {
                author: &author,
                default_cover: &default_cover,
                now_millis: chrono::Utc::now().timestamp_millis(),
            };
            let result = submit::submit_song(
                stores.songs.as_ref(),
                stores.media.as_ref(),
                &form,
                editing.as_ref(),
                &ctx,
            )
            .await;
            let msg = match result {
                Ok(SubmitOutcome::Created(song)) => AppMessage::AdminDone {
                    ok: true,
                    message: format!("“{}” published", song.title),
                },
                Ok(SubmitOutcome::Updated { .. }) => AppMessage::AdminDone {
                    ok: true,
                    message: "changes saved".to_string(),
                },
                Err(e) => {
                    warn!("song submit failed: {}", e);
                    AppMessage::AdminDone {
                        ok: false,
                        message: format!("save failed: {}", e),
                    }
                }
            };
            let _ = tx.send(msg).await;
        });
    }

    fn spawn_delete(&mut self, song: Song) {
        if !self.admin_task_allowed() {
            return;
        }
        let Some(tx) = self.msg_tx.clone() else {
            return;
        };
        self.state.admin_busy = true;
        self.toast.spinner(format!("deleting “{}”…", song.title));

        let songs = self.stores.songs.clone();
        tokio::spawn(async move {
            let msg = match submit::delete_song(songs.as_ref(), &song.id).await {
                Ok(()) => AppMessage::AdminDone {
                    ok: true,
                    message: format!("“{}” deleted", song.title),
                },
                Err(e) => {
                    warn!("song delete failed: {}", e);
                    AppMessage::AdminDone {
                        ok: false,
                        message: format!("delete failed: {}", e),
                    }
                }
            };
            let _ = tx.send(msg).await;
        });
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let full = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), full);

        // Single page column, centered on wide terminals.
        let width = full.width.min(MAX_COLUMN_W);
        let area = Rect {
            x: full.x + (full.width - width) / 2,
            width,
            ..full
        };

        let floating_h = if self.state.floating_player_visible() {
            self.floating_player.min_height()
        } else {
            0
        };
        let nav_h = if self.state.bottom_nav_visible() { 3 } else { 0 };
        let prompt_h = if self.state.input_mode == InputMode::Command { 2 } else { 0 };
        let keys_h = if self.show_keys_bar { 1 } else { 0 };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(floating_h),
                Constraint::Length(nav_h),
                Constraint::Length(prompt_h),
                Constraint::Length(1),
                Constraint::Length(keys_h),
            ])
            .split(area);

        let focused = self.focus.current();
        let main_id = main_view_id(&self.state.route);
        self.pane_areas.main = rows[0];
        let main_focused = focused == Some(main_id);
        self.with_component(main_id, |c, s| c.draw(frame, rows[0], main_focused, s));

        self.pane_areas.floating = rows[1];
        if floating_h > 0 {
            let f = focused == Some(ComponentId::FloatingPlayer);
            self.floating_player.draw(frame, rows[1], f, &self.state);
        }
        self.pane_areas.nav = rows[2];
        if nav_h > 0 {
            let f = focused == Some(ComponentId::BottomNav);
            self.bottom_nav.draw(frame, rows[2], f, &self.state);
        }
        if prompt_h > 0 {
            self.prompt.draw(frame, rows[3], true);
        }

        status_bar::draw_log_bar(
            frame,
            rows[4],
            self.state.player.mpv_health.badge_label(),
            self.state.last_log(),
        );
        if self.show_keys_bar {
            status_bar::draw_keys_bar(frame, rows[5], self.state.input_mode, &self.state.route);
        }

        if self.show_help {
            self.help_overlay.draw(frame, full, false, &self.state);
        }

        self.toast.draw(frame, full);
    }

    async fn send_cmd(&self, cmd: Command) {
        if self.cmd_tx.send(PlayerEvent::Command(cmd)).await.is_err() {
            warn!("player core is gone, command dropped");
        }
    }

    fn push_log(&mut self, msg: String) {
        self.state.logs.push(msg);
        if self.state.logs.len() > MAX_LOG_LINES {
            self.state.logs.remove(0);
        }
    }

    fn save_ui_session_state(&self) {
        let ui_state = UiSessionState {
            admin_email: self.state.admin_user.clone(),
            hide_keys_bar: !self.show_keys_bar,
        };
        if let Err(e) = save_ui_session_state(&self.ui_state_path, &ui_state) {
            warn!("could not save ui session: {}", e);
        }
    }
}

fn load_ui_session_state(path: &PathBuf) -> UiSessionState {
    let Ok(content) = std::fs::read_to_string(path) else {
        return UiSessionState::default();
    };
    serde_json::from_str(&content).unwrap_or_default()
}

fn save_ui_session_state(path: &PathBuf, state: &UiSessionState) -> anyhow::Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(state)?)?;
    Ok(())
}
