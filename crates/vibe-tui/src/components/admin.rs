//! Admin component: login, catalog management and the add/edit form.
//!
//! Text-capturing modes (login, form, delete confirmation) emit `BeginEdit`
//! on entry and `EndEdit` on exit so the App routes every key here.

use std::path::PathBuf;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use vibe_proto::catalog::submit::SongForm;
use vibe_proto::Song;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    router::Route,
    theme::{
        style_button, style_muted, style_secondary, C_BADGE_PENDING, C_HEART, C_LIME, C_MUTED,
        C_PRIMARY, C_PURPLE,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        popup::{draw_popup, key_row},
        scrollable_list::ScrollableList,
        song_row::truncate,
        text_field::{decode_line_breaks, encode_line_breaks, TextField},
        toast::Severity,
    },
};

const F_TITLE: usize = 0;
const F_ISRC: usize = 1;
const F_LYRICS: usize = 2;
const F_AUDIO_FILE: usize = 3;
const F_AUDIO_URL: usize = 4;
const F_COVER_FILE: usize = 5;
const F_COVER_URL: usize = 6;

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Login,
    List,
    Form { editing: Option<Song> },
    ConfirmDelete(Song),
}

impl Mode {
    fn captures_text(&self) -> bool {
        !matches!(self, Mode::List)
    }
}

pub struct Admin {
    mode: Mode,
    /// The admin route is showing.
    active: bool,
    email: TextField,
    password: TextField,
    login_field: usize,
    form: Vec<TextField>,
    form_field: usize,
    list: ScrollableList<Song>,
    synced_rev: Option<u64>,
}

fn form_fields() -> Vec<TextField> {
    vec![
        TextField::new("Title", "song title"),
        TextField::new("ISRC", "BR-XXX-00-00000 (optional)"),
        TextField::new("Lyrics", "use \\n for line breaks"),
        TextField::new("Audio file", "/path/to/track.mp3"),
        TextField::new("Audio URL", "https://… (instead of a file)"),
        TextField::new("Cover file", "/path/to/cover.jpg (optional)"),
        TextField::new("Cover URL", "https://… (optional)"),
    ]
}

fn optional_path(text: &str) -> Option<PathBuf> {
    let t = text.trim();
    (!t.is_empty()).then(|| PathBuf::from(t))
}

impl Admin {
    pub fn new() -> Self {
        Self {
            mode: Mode::List,
            active: false,
            email: TextField::new("Email", "admin@example.com"),
            password: TextField::new("Password", "••••••").masked(),
            login_field: 0,
            form: form_fields(),
            form_field: 0,
            list: ScrollableList::new(|song: &Song, q: &str| song.matches(q)),
            synced_rev: None,
        }
    }

    /// Switch mode, emitting the edit transitions the App needs.
    fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        let was = self.mode.captures_text();
        let now = mode.captures_text();
        self.mode = mode;
        match (was, now) {
            (false, true) => vec![Action::BeginEdit],
            (true, false) => vec![Action::EndEdit],
            _ => vec![],
        }
    }

    /// Keep the mode in line with the session: logged out means login.
    fn sync_session(&mut self, state: &AppState) -> Vec<Action> {
        if !self.active {
            return vec![];
        }
        match (&self.mode, state.is_admin()) {
            (Mode::Login, true) => {
                self.password.clear();
                self.set_mode(Mode::List)
            }
            (Mode::Login, false) => vec![],
            (_, false) => self.set_mode(Mode::Login),
            _ => vec![],
        }
    }

    fn sync_list(&mut self, state: &AppState) {
        if self.synced_rev == Some(state.player.rev) {
            return;
        }
        self.synced_rev = Some(state.player.rev);
        let selected = self.list.selected_item().map(|s| s.id.clone());
        self.list.set_items(state.player.songs.clone());
        if let Some(id) = selected {
            self.list.select_where(|s| s.id == id);
        }
    }

    fn open_form(&mut self, editing: Option<Song>) -> Vec<Action> {
        self.form = form_fields();
        self.form_field = F_TITLE;
        if let Some(song) = &editing {
            let f = SongForm::from_song(song);
            self.form[F_TITLE].set_value(f.title);
            self.form[F_ISRC].set_value(f.isrc);
            self.form[F_LYRICS].set_value(encode_line_breaks(&f.lyrics));
        }
        self.set_mode(Mode::Form { editing })
    }

    fn build_form(&self) -> SongForm {
        SongForm {
            title: self.form[F_TITLE].value().trim().to_string(),
            isrc: self.form[F_ISRC].value().trim().to_string(),
            lyrics: decode_line_breaks(self.form[F_LYRICS].value()),
            audio_file: optional_path(self.form[F_AUDIO_FILE].value()),
            audio_url: self.form[F_AUDIO_URL].value().trim().to_string(),
            cover_file: optional_path(self.form[F_COVER_FILE].value()),
            cover_url: self.form[F_COVER_URL].value().trim().to_string(),
        }
    }

    fn submit(&self, editing: Option<Song>, state: &AppState) -> Vec<Action> {
        if state.admin_busy {
            return vec![Action::Toast(Severity::Warning, "still saving…".to_string())];
        }
        let form = self.build_form();
        if let Err(e) = form.validate(editing.as_ref()) {
            return vec![Action::Toast(Severity::Error, e.to_string())];
        }
        vec![Action::SubmitSong { form, editing }]
    }

    fn handle_login_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if !state.login_enabled && key.code != KeyCode::Esc {
            return vec![];
        }
        match key.code {
            KeyCode::Esc => {
                let mut actions = self.set_mode(Mode::List);
                actions.push(Action::Back);
                actions
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::BackTab | KeyCode::Up => {
                self.login_field = 1 - self.login_field;
                vec![]
            }
            KeyCode::Enter if self.login_field == 0 => {
                self.login_field = 1;
                vec![]
            }
            KeyCode::Enter => {
                let email = self.email.value().trim().to_string();
                let password = self.password.value().to_string();
                self.password.clear();
                vec![Action::AdminLogin { email, password }]
            }
            _ => {
                if self.login_field == 0 {
                    self.email.handle_key(key);
                } else {
                    self.password.handle_key(key);
                }
                vec![]
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        self.sync_list(state);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::Char('g') => self.list.select_first(),
            KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Char('a') => return self.open_form(None),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(song) = self.list.selected_item().cloned() {
                    return self.open_form(Some(song));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(song) = self.list.selected_item().cloned() {
                    return self.set_mode(Mode::ConfirmDelete(song));
                }
            }
            KeyCode::Char('x') => return vec![Action::AdminLogout],
            _ => {}
        }
        vec![]
    }

    fn handle_form_key(&mut self, key: KeyEvent, editing: Option<Song>, state: &AppState) -> Vec<Action> {
        let last = self.form.len() - 1;
        match key.code {
            KeyCode::Esc => self.set_mode(Mode::List),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.submit(editing, state)
            }
            KeyCode::Tab | KeyCode::Down => {
                self.form_field = (self.form_field + 1) % self.form.len();
                vec![]
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.form_field = self.form_field.checked_sub(1).unwrap_or(last);
                vec![]
            }
            KeyCode::Enter if self.form_field == last => self.submit(editing, state),
            KeyCode::Enter => {
                self.form_field += 1;
                vec![]
            }
            _ => {
                self.form[self.form_field].handle_key(key);
                vec![]
            }
        }
    }

    fn draw_login(&self, frame: &mut Frame, inner: Rect, state: &AppState) {
        if !state.login_enabled {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(" admin login is disabled", Style::default().fg(C_PRIMARY))),
                Line::from(Span::styled(
                    " set [admin] email and password in config.toml",
                    style_muted(),
                )),
                Line::from(Span::styled(" or export VIBE_ADMIN_PASSWORD", style_muted())),
            ];
            frame.render_widget(Paragraph::new(lines), inner);
            return;
        }
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " sign in to manage the catalog",
                style_secondary(),
            ))),
            Rect { height: 1, ..inner },
        );
        let mut y = inner.y + 2;
        for (i, field) in [&self.email, &self.password].into_iter().enumerate() {
            if y + 2 > inner.y + inner.height {
                break;
            }
            field.draw(frame, Rect { y, height: 2, ..inner }, i == self.login_field);
            y += 3;
        }
        if y < inner.y + inner.height {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::raw(" "),
                    Span::styled(" Enter  sign in ", style_button()),
                    Span::styled("   Esc back", style_muted()),
                ])),
                Rect { y, height: 1, ..inner },
            );
        }
    }

    fn draw_list(&mut self, frame: &mut Frame, inner: Rect, focused: bool, state: &AppState) {
        self.sync_list(state);
        let user = state.admin_user.as_deref().unwrap_or_default();
        let header = vec![
            Line::from(vec![
                Span::styled(" signed in as ", style_muted()),
                Span::styled(user.to_string(), Style::default().fg(C_PURPLE)),
                Span::styled("   x logout", style_muted()),
            ]),
            Line::from(vec![
                Span::raw(" "),
                Span::styled(" a  register new work ", style_button()),
            ]),
            Line::from(Span::styled(
                format!(" registered works ({})", self.list.len()),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
        ];
        let header_h = (header.len() as u16).min(inner.height);
        frame.render_widget(Paragraph::new(header), Rect { height: header_h, ..inner });

        let rows = Rect {
            y: inner.y + header_h,
            height: inner.height - header_h,
            ..inner
        };
        let height = rows.height as usize;
        self.list.ensure_visible(height);
        let selected = self.list.selected_in_view();
        let title_w = (rows.width as usize).saturating_sub(24);
        let lines: Vec<Line> = self
            .list
            .visible_items(height)
            .into_iter()
            .enumerate()
            .map(|(i, song)| {
                let isrc = song
                    .isrc
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or("no registration");
                let title = truncate(&song.title, title_w);
                let pad = title_w.saturating_sub(unicode_width::UnicodeWidthStr::width(title.as_str()));
                let line = Line::from(vec![
                    Span::styled(format!("  {}", title), Style::default().fg(C_PRIMARY)),
                    Span::raw(" ".repeat(pad)),
                    Span::styled(format!("  {}", isrc), Style::default().fg(C_MUTED)),
                ]);
                if focused && i == selected {
                    line.style(crate::theme::style_selected())
                } else {
                    line
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), rows);
    }

    fn draw_form(&self, frame: &mut Frame, inner: Rect, editing: Option<&Song>, state: &AppState) {
        let mut y = inner.y;
        let bottom = inner.y + inner.height;
        if let Some(song) = editing {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(" editing ", style_muted()),
                    Span::styled(song.title.clone(), Style::default().fg(C_LIME)),
                ])),
                Rect { y, height: 1, ..inner },
            );
            y += 1;
        }
        // keep the focused field on screen when the pane is short
        let per_field = 2u16;
        let room = (bottom.saturating_sub(y + 2) / per_field) as usize;
        let first = self.form_field.saturating_sub(room.saturating_sub(1));
        for (i, field) in self.form.iter().enumerate().skip(first) {
            if y + per_field > bottom.saturating_sub(2) {
                break;
            }
            field.draw(frame, Rect { y, height: 2, ..inner }, i == self.form_field);
            y += per_field;
            if i == F_AUDIO_URL && editing.is_some() && y < bottom {
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(
                        "   leave blank to keep current audio",
                        Style::default().fg(C_MUTED),
                    ))),
                    Rect { y, height: 1, ..inner },
                );
                y += 1;
            }
        }
        if y < bottom {
            let submit = if state.admin_busy {
                Span::styled(" ⠋ saving… ", Style::default().fg(C_BADGE_PENDING))
            } else if editing.is_some() {
                Span::styled(" Ctrl+S  save changes ", style_button())
            } else {
                Span::styled(" Ctrl+S  publish ", style_button())
            };
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::raw(" "),
                    submit,
                    Span::styled("   Esc cancel", style_muted()),
                ])),
                Rect {
                    y: bottom - 1,
                    height: 1,
                    ..inner
                },
            );
        }
    }
}

impl Default for Admin {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Admin {
    fn id(&self) -> ComponentId {
        ComponentId::Admin
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match self.mode.clone() {
            Mode::Login => self.handle_login_key(key, state),
            Mode::List => self.handle_list_key(key, state),
            Mode::Form { editing } => self.handle_form_key(key, editing, state),
            Mode::ConfirmDelete(song) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    let mut actions = self.set_mode(Mode::List);
                    actions.push(Action::DeleteSong(song));
                    actions
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.set_mode(Mode::List),
                _ => vec![],
            },
        }
    }

    fn tick(&mut self, state: &AppState) -> Vec<Action> {
        self.sync_session(state)
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        match action {
            Action::RouteChanged(route) => {
                let was_active = self.active;
                self.active = *route == Route::Admin;
                if self.active && !was_active {
                    let start = if state.is_admin() { Mode::List } else { Mode::Login };
                    self.login_field = 0;
                    return self.set_mode(start);
                }
                if !self.active && was_active {
                    return self.set_mode(Mode::List);
                }
            }
            Action::AdminTaskDone { ok: true } => {
                if let Mode::Form { .. } = self.mode {
                    return self.set_mode(Mode::List);
                }
            }
            Action::AdminLogout => {
                if self.active {
                    return self.set_mode(Mode::Login);
                }
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let (title, badge) = match &self.mode {
            Mode::Login => ("restricted area", None),
            Mode::Form { editing: Some(_) } => ("edit work", None),
            Mode::Form { editing: None } => ("new work", None),
            _ => (
                "admin panel",
                state.admin_busy.then_some(Badge {
                    text: "SAVING",
                    color: C_BADGE_PENDING,
                }),
            ),
        };
        let block = pane_chrome(title, focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }

        match self.mode.clone() {
            Mode::Login => self.draw_login(frame, inner, state),
            Mode::List => self.draw_list(frame, inner, focused, state),
            Mode::Form { editing } => self.draw_form(frame, inner, editing.as_ref(), state),
            Mode::ConfirmDelete(song) => {
                self.draw_list(frame, inner, focused, state);
                let lines = vec![
                    Line::from(vec![
                        Span::styled(" delete ", Style::default().fg(C_HEART)),
                        Span::styled(
                            format!("“{}”", song.title),
                            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled("?", Style::default().fg(C_HEART)),
                    ]),
                    Line::from(Span::styled(
                        " this removes it from the catalog for everyone",
                        Style::default().fg(C_MUTED),
                    )),
                    Line::from(""),
                    key_row("y", "yes, delete"),
                    key_row("n / Esc", "keep it"),
                ];
                draw_popup(frame, area, "are you sure?", lines, 70);
            }
        }
    }

    fn wants_text_input(&self) -> bool {
        self.active && self.mode.captures_text()
    }
}
