//! SongList component: the home page, the repertoire and the favorites view.
//! All three are a selectable song list; home adds the artist card above it.

use std::time::Instant;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use vibe_proto::{CatalogStatus, Song};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    router::Route,
    theme::{
        style_button, style_muted, C_BADGE_ERR, C_BADGE_PENDING, C_MUTED, C_PRIMARY, C_PURPLE,
        C_PURPLE_DEEP, C_SECONDARY, C_SURFACE_DARK,
    },
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
        song_row::song_line,
        toast::Severity,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Home,
    Music,
    Favorites,
}

impl ListKind {
    fn title(self) -> &'static str {
        match self {
            Self::Home => "most played",
            Self::Music => "repertoire",
            Self::Favorites => "favorites",
        }
    }
}

/// Rows taken by the greeting and the artist card on the home page.
const HOME_HEADER_ROWS: u16 = 6;
const DOUBLE_CLICK_MS: u128 = 400;

pub struct SongList {
    kind: ListKind,
    list: ScrollableList<Song>,
    filter_input: FilterInput,
    /// Player revision the list items were built from.
    synced_rev: Option<u64>,
    /// Inner rows of the list, from the last draw. Used for mouse hits.
    list_area: Rect,
    card_area: Rect,
    last_click: Option<(usize, Instant)>,
}

impl SongList {
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            list: ScrollableList::new(|song: &Song, q: &str| song.matches(q)),
            filter_input: FilterInput::new("title, author or ISRC…"),
            synced_rev: None,
            list_area: Rect::default(),
            card_area: Rect::default(),
            last_click: None,
        }
    }

    /// Rebuild items when the player snapshot changed.
    fn sync(&mut self, state: &AppState) {
        if self.synced_rev == Some(state.player.rev) {
            return;
        }
        self.synced_rev = Some(state.player.rev);
        let selected = self.list.selected_item().map(|s| s.id.clone());
        let items: Vec<Song> = match self.kind {
            ListKind::Home | ListKind::Music => state.player.songs.clone(),
            ListKind::Favorites => state.player.liked_songs().into_iter().cloned().collect(),
        };
        self.list.set_items(items);
        if let Some(id) = selected {
            self.list.select_where(|s| s.id == id);
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.list.selected_item().map(|s| s.id.clone())
    }

    fn share_link(song: &Song, state: &AppState) -> Option<String> {
        state
            .artist
            .song_share_url(&song.id)
            .or_else(|| song.audio_url.clone().filter(|u| !u.trim().is_empty()))
    }

    fn draw_home_header(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(5)])
            .split(area);

        let greeting = Line::from(vec![
            Span::styled(" Welcome, ", Style::default().fg(C_SECONDARY)),
            Span::styled(
                "fan and listener",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::styled("    / search  f favorites", style_muted()),
        ]);
        frame.render_widget(Paragraph::new(greeting), rows[0]);

        self.card_area = rows[1];
        let card = vec![
            Line::from(Span::styled(
                "OFFICIAL PORTFOLIO",
                Style::default().fg(C_PURPLE_DEEP).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                state.artist.name.clone(),
                Style::default()
                    .fg(C_SURFACE_DARK)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("b  see biography ›", Style::default().fg(C_SURFACE_DARK))),
        ];
        frame.render_widget(
            Paragraph::new(card).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(C_PURPLE))
                    .title(Span::styled(" the composer ", Style::default().fg(C_PURPLE_DEEP)))
                    .style(Style::default().bg(C_PURPLE)),
            ),
            rows[1],
        );
    }

    fn empty_lines(&self, state: &AppState) -> Vec<Line<'static>> {
        match &state.player.catalog {
            CatalogStatus::Loading => {
                return vec![Line::from(Span::styled(" loading catalog…", style_muted()))]
            }
            CatalogStatus::Failed(e) => {
                return vec![
                    Line::from(Span::styled(
                        format!(" catalog unavailable: {}", e),
                        Style::default().fg(C_BADGE_ERR),
                    )),
                    Line::from(Span::styled(" R  retry", style_muted())),
                ]
            }
            CatalogStatus::Ready => {}
        }
        if !self.list.filter().is_empty() {
            return vec![Line::from(Span::styled(" no matches", style_muted()))];
        }
        match self.kind {
            ListKind::Favorites => vec![
                Line::from(""),
                Line::from(Span::styled(
                    " No favorites yet",
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    " Press l on a song to save it here.",
                    style_muted(),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::raw(" "),
                    Span::styled(" Enter  explore songs ", style_button()),
                ]),
            ],
            _ => vec![Line::from(Span::styled(
                " No songs available right now.",
                style_muted(),
            ))],
        }
    }
}

impl Component for SongList {
    fn id(&self) -> ComponentId {
        match self.kind {
            ListKind::Home => ComponentId::Home,
            ListKind::Music => ComponentId::Music,
            ListKind::Favorites => ComponentId::Favorites,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        self.sync(state);

        if self.filter_input.is_active() {
            match key.code {
                KeyCode::Up => {
                    self.list.select_up(1);
                    return vec![];
                }
                KeyCode::Down => {
                    self.list.select_down(1);
                    return vec![];
                }
                _ => {}
            }
            return match self.filter_input.handle_key(key) {
                FilterAction::Changed(q) => {
                    self.list.set_filter(&q);
                    vec![]
                }
                FilterAction::Confirmed => vec![Action::CloseFilter],
                FilterAction::Cancelled => {
                    self.list.set_filter("");
                    vec![Action::CloseFilter]
                }
            };
        }

        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Char('J') => {
                if let Some(id) = state.player.current_id() {
                    self.list.select_where(|s| s.id == id);
                }
            }

            KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    return vec![Action::Play(id)];
                }
                if self.kind == ListKind::Favorites && self.list.total_len() == 0 {
                    return vec![Action::Navigate(Route::Music)];
                }
            }
            KeyCode::Char('o') | KeyCode::Right => {
                if let Some(id) = self.selected_id() {
                    return vec![Action::Navigate(Route::Song(id))];
                }
            }
            KeyCode::Char('l') => {
                if let Some(id) = self.selected_id() {
                    return vec![Action::ToggleLike(id)];
                }
            }
            KeyCode::Char('y') => {
                if let Some(song) = self.list.selected_item() {
                    return match Self::share_link(song, state) {
                        Some(link) => vec![Action::CopyToClipboard(link)],
                        None => vec![Action::Toast(
                            Severity::Warning,
                            "no share link for this song".to_string(),
                        )],
                    };
                }
            }
            KeyCode::Char('/') => {
                self.filter_input.activate();
                return vec![Action::OpenFilter];
            }
            KeyCode::Char('b') if self.kind == ListKind::Home => {
                return vec![Action::Navigate(Route::Bio)];
            }
            KeyCode::Char('f') if self.kind == ListKind::Home => {
                return vec![Action::Navigate(Route::Favorites)];
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        self.sync(state);
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let pos = (event.column, event.row).into();
                if self.kind == ListKind::Home && self.card_area.contains(pos) {
                    return vec![Action::Navigate(Route::Bio)];
                }
                if !self.list_area.contains(pos) {
                    return vec![];
                }
                let row = (event.row - self.list_area.y) as usize;
                let on_heart = event.column + 2 >= self.list_area.x + self.list_area.width;
                let is_double = self
                    .last_click
                    .is_some_and(|(r, t)| r == row && t.elapsed().as_millis() < DOUBLE_CLICK_MS);
                if !self.list.handle_click(row) {
                    self.last_click = None;
                    return vec![];
                }
                let Some(id) = self.selected_id() else {
                    return vec![];
                };
                if on_heart {
                    self.last_click = None;
                    return vec![Action::ToggleLike(id)];
                }
                if is_double {
                    self.last_click = None;
                    return vec![Action::Navigate(Route::Song(id))];
                }
                self.last_click = Some((row, Instant::now()));
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        match action {
            Action::CloseFilter if self.filter_input.is_active() => {
                self.filter_input.reset();
                self.list.set_filter("");
            }
            Action::RouteChanged(_) => {
                self.sync(state);
                // land on the current song when entering the list
                if let Some(id) = state.player.current_id() {
                    self.list.select_where(|s| s.id == id);
                }
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.sync(state);

        let list_pane = if self.kind == ListKind::Home && area.height > HOME_HEADER_ROWS + 4 {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(HOME_HEADER_ROWS), Constraint::Min(0)])
                .split(area);
            self.draw_home_header(frame, parts[0], state);
            parts[1]
        } else {
            self.card_area = Rect::default();
            area
        };

        let count;
        let badge = match &state.player.catalog {
            CatalogStatus::Loading => Some(Badge {
                text: "LOADING",
                color: C_BADGE_PENDING,
            }),
            CatalogStatus::Failed(_) => Some(Badge {
                text: "OFFLINE",
                color: C_BADGE_ERR,
            }),
            CatalogStatus::Ready => {
                count = if self.list.filter().is_empty() {
                    format!("{}", self.list.len())
                } else {
                    format!("{}/{}", self.list.len(), self.list.total_len())
                };
                Some(Badge {
                    text: &count,
                    color: C_MUTED,
                })
            }
        };
        let block = pane_chrome(self.kind.title(), focused, badge);
        let inner = block.inner(list_pane);
        frame.render_widget(block, list_pane);

        let show_filter = self.filter_input.is_active() || !self.list.filter().is_empty();
        let (rows_area, filter_area) = if show_filter && inner.height > 1 {
            (
                Rect {
                    height: inner.height - 1,
                    ..inner
                },
                Some(Rect {
                    y: inner.y + inner.height - 1,
                    height: 1,
                    ..inner
                }),
            )
        } else {
            (inner, None)
        };
        self.list_area = rows_area;

        if self.list.is_empty() {
            frame.render_widget(Paragraph::new(self.empty_lines(state)), rows_area);
        } else {
            let height = rows_area.height as usize;
            self.list.ensure_visible(height);
            let selected_row = self.list.selected_in_view();
            let lines: Vec<Line> = self
                .list
                .visible_items(height)
                .into_iter()
                .enumerate()
                .map(|(i, song)| {
                    song_line(song, &state.player, focused && i == selected_row, rows_area.width)
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), rows_area);
        }

        if let Some(fa) = filter_area {
            self.filter_input.draw(frame, fa);
        }
    }

    fn wants_text_input(&self) -> bool {
        self.filter_input.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibe_proto::config::ArtistConfig;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn song(id: &str, title: &str) -> Song {
        Song {
            id: id.to_string(),
            title: title.to_string(),
            author: "Paulo Oliveira".to_string(),
            audio_url: Some(format!("https://cdn/{}.mp3", id)),
            ..Default::default()
        }
    }

    fn state() -> AppState {
        let mut s = AppState::new(ArtistConfig::default(), false);
        s.player.rev = 1;
        s.player.catalog = CatalogStatus::Ready;
        s.player.songs = vec![song("1", "Ventania"), song("2", "Maré"), song("3", "Sertão")];
        s.player.liked = vec!["3".into()];
        s
    }

    #[test]
    fn test_enter_plays_and_o_opens_selected() {
        let st = state();
        let mut list = SongList::new(ListKind::Music);
        list.handle_key(key(KeyCode::Down), &st);
        let actions = list.handle_key(key(KeyCode::Enter), &st);
        assert!(matches!(actions.as_slice(), [Action::Play(id)] if id == "2"));
        let actions = list.handle_key(key(KeyCode::Char('o')), &st);
        assert!(matches!(actions.as_slice(), [Action::Navigate(Route::Song(id))] if id == "2"));
    }

    #[test]
    fn test_like_toggles_selected() {
        let st = state();
        let mut list = SongList::new(ListKind::Home);
        let actions = list.handle_key(key(KeyCode::Char('l')), &st);
        assert!(matches!(actions.as_slice(), [Action::ToggleLike(id)] if id == "1"));
    }

    #[test]
    fn test_favorites_lists_only_liked() {
        let st = state();
        let mut list = SongList::new(ListKind::Favorites);
        let actions = list.handle_key(key(KeyCode::Enter), &st);
        assert!(matches!(actions.as_slice(), [Action::Play(id)] if id == "3"));
    }

    #[test]
    fn test_empty_favorites_enter_explores_music() {
        let mut st = state();
        st.player.liked.clear();
        let mut list = SongList::new(ListKind::Favorites);
        let actions = list.handle_key(key(KeyCode::Enter), &st);
        assert!(matches!(actions.as_slice(), [Action::Navigate(Route::Music)]));
    }

    #[test]
    fn test_filter_narrows_and_escape_restores() {
        let st = state();
        let mut list = SongList::new(ListKind::Music);
        let actions = list.handle_key(key(KeyCode::Char('/')), &st);
        assert!(matches!(actions.as_slice(), [Action::OpenFilter]));
        assert!(list.wants_text_input());
        for c in "mar".chars() {
            list.handle_key(key(KeyCode::Char(c)), &st);
        }
        assert_eq!(list.list.len(), 1);
        // first Esc clears the text, second closes
        list.handle_key(key(KeyCode::Esc), &st);
        assert_eq!(list.list.len(), 3);
        let actions = list.handle_key(key(KeyCode::Esc), &st);
        assert!(matches!(actions.as_slice(), [Action::CloseFilter]));
        assert!(!list.wants_text_input());
    }

    #[test]
    fn test_selection_survives_catalog_refresh() {
        let mut st = state();
        let mut list = SongList::new(ListKind::Music);
        list.handle_key(key(KeyCode::Char('G')), &st);
        st.player.rev = 2;
        st.player.songs.insert(0, song("0", "Nova"));
        let actions = list.handle_key(key(KeyCode::Enter), &st);
        assert!(matches!(actions.as_slice(), [Action::Play(id)] if id == "3"));
    }

    #[test]
    fn test_home_shortcuts() {
        let st = state();
        let mut list = SongList::new(ListKind::Home);
        let actions = list.handle_key(key(KeyCode::Char('b')), &st);
        assert!(matches!(actions.as_slice(), [Action::Navigate(Route::Bio)]));
        let actions = list.handle_key(key(KeyCode::Char('f')), &st);
        assert!(matches!(actions.as_slice(), [Action::Navigate(Route::Favorites)]));

        let mut music = SongList::new(ListKind::Music);
        assert!(music.handle_key(key(KeyCode::Char('b')), &st).is_empty());
    }
}
