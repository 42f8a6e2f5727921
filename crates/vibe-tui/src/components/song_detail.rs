//! SongDetail component: the "now playing" page for one song.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use vibe_proto::{PlaybackStatus, Song};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    intent::RenderHint,
    router::Route,
    theme::{
        style_button, style_muted, style_secondary, style_title, C_HEART, C_LIME, C_LOADING,
        C_MUTED, C_PRIMARY, C_SHARE,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        popup::{draw_popup, key_row},
        progress_bar::draw_progress,
        toast::Severity,
    },
};

const SEEK_STEP: f64 = 5.0;

pub struct SongDetail {
    song_id: Option<String>,
    share_open: bool,
    lyrics_scroll: u16,
}

impl SongDetail {
    pub fn new() -> Self {
        Self {
            song_id: None,
            share_open: false,
            lyrics_scroll: 0,
        }
    }

    fn song<'a>(&self, state: &'a AppState) -> Option<&'a Song> {
        state.player.resolve_song(self.song_id.as_deref()?)
    }

    fn share_link(song: &Song, state: &AppState) -> Option<String> {
        state
            .artist
            .song_share_url(&song.id)
            .or_else(|| song.audio_url.clone().filter(|u| !u.trim().is_empty()))
    }

    fn play_label(song: &Song, state: &AppState) -> (&'static str, Style) {
        let current = state.player.is_current(&song.id);
        if !current {
            return (" ▶  play ", style_button());
        }
        let (label, style) = match state.player.playback_status {
            PlaybackStatus::Loading => (" …  loading ", Style::default().fg(C_LOADING)),
            _ if state.player.is_playing => (" ‖  pause ", style_button()),
            _ => (" ▶  play ", style_button()),
        };
        match state.pause_hint {
            RenderHint::PendingHidden => ("          ", style),
            RenderHint::TimedOut => (label, Style::default().fg(C_MUTED)),
            _ => (label, style),
        }
    }
}

impl Default for SongDetail {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SongDetail {
    fn id(&self) -> ComponentId {
        ComponentId::SongDetail
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let Some(song) = self.song(state) else {
            return vec![];
        };
        let current = state.player.is_current(&song.id);

        if self.share_open {
            match key.code {
                KeyCode::Esc | KeyCode::Char('S') | KeyCode::Char('q') => self.share_open = false,
                KeyCode::Char('y') | KeyCode::Char('c') | KeyCode::Enter => {
                    self.share_open = false;
                    if let Some(link) = Self::share_link(song, state) {
                        return vec![Action::CopyToClipboard(link)];
                    }
                }
                _ => {}
            }
            // overlay swallows everything else
            return vec![];
        }

        match key.code {
            KeyCode::Enter => return vec![Action::Play(song.id.clone())],
            KeyCode::Left if current => return vec![Action::SeekRelative(-SEEK_STEP)],
            KeyCode::Right if current => return vec![Action::SeekRelative(SEEK_STEP)],
            KeyCode::Char('l') => return vec![Action::ToggleLike(song.id.clone())],
            KeyCode::Char('S') => {
                self.share_open = true;
            }
            KeyCode::Char('d') => {
                return match song.audio_url.as_deref().filter(|u| !u.trim().is_empty()) {
                    Some(url) => vec![Action::CopyToClipboard(url.to_string())],
                    None => vec![Action::Toast(
                        Severity::Warning,
                        "this song has no audio file".to_string(),
                    )],
                };
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.lyrics_scroll = self.lyrics_scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.lyrics_scroll = self.lyrics_scroll.saturating_sub(1);
            }
            KeyCode::Char('g') => self.lyrics_scroll = 0,
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::ScrollDown => self.lyrics_scroll = self.lyrics_scroll.saturating_add(1),
            MouseEventKind::ScrollUp => self.lyrics_scroll = self.lyrics_scroll.saturating_sub(1),
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::RouteChanged(route) = action {
            let id = match route {
                Route::Song(id) => Some(id.clone()),
                _ => None,
            };
            if id != self.song_id {
                self.lyrics_scroll = 0;
            }
            self.song_id = id;
            self.share_open = false;
        }
        vec![]
    }

    fn has_modal(&self) -> bool {
        self.share_open
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let liked = self
            .song_id
            .as_deref()
            .is_some_and(|id| state.player.is_liked(id));
        let badge = liked.then_some(Badge {
            text: "♥",
            color: C_HEART,
        });
        let block = pane_chrome("now playing", focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(song) = self.song(state) else {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(" song not found", style_title())),
                Line::from(Span::styled(" Esc  back", style_muted())),
            ];
            frame.render_widget(Paragraph::new(lines), inner);
            return;
        };
        let current = state.player.is_current(&song.id);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // cover
                Constraint::Length(1), // spacer
                Constraint::Length(1), // title
                Constraint::Length(1), // author
                Constraint::Length(1), // spacer
                Constraint::Length(1), // progress
                Constraint::Length(1), // controls
                Constraint::Length(1), // spacer
                Constraint::Min(0),    // lyrics
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" ◼ cover ", style_muted()),
                Span::styled(state.cover_for(song).to_string(), style_secondary()),
            ])),
            rows[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", song.title),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ))),
            rows[2],
        );
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", song.author),
                style_secondary(),
            ))),
            rows[3],
        );

        let (play_label, play_style) = Self::play_label(song, state);
        if current {
            draw_progress(
                frame,
                rows[5].inner(ratatui::layout::Margin::new(1, 0)),
                state.player.progress_secs,
                state.player.duration_secs,
            );
            let controls = Line::from(vec![
                Span::styled(" r ⤮   p ⏮   ", Style::default().fg(C_MUTED)),
                Span::styled(play_label, play_style),
                Span::styled("   n ⏭   ←/→ ±5s", Style::default().fg(C_MUTED)),
            ]);
            frame.render_widget(Paragraph::new(controls), rows[6]);
        } else {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::raw(" "),
                    Span::styled(play_label, play_style),
                    Span::styled("  Enter", style_muted()),
                ])),
                rows[6],
            );
        }

        let lyrics: Vec<Line> = match song.lyrics_text() {
            Some(text) => text
                .lines()
                .map(|l| Line::from(Span::styled(format!(" {}", l), Style::default().fg(C_PRIMARY))))
                .collect(),
            None => vec![Line::from(Span::styled(" loading lyrics…", style_muted()))],
        };
        frame.render_widget(
            Paragraph::new(lyrics)
                .wrap(Wrap { trim: false })
                .scroll((self.lyrics_scroll, 0)),
            rows[8],
        );

        if self.share_open {
            let link = Self::share_link(song, state);
            let lines = vec![
                Line::from(Span::styled(
                    format!(" {}", song.title),
                    Style::default().fg(C_LIME).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!(" {}", link.as_deref().unwrap_or("no share link configured")),
                    Style::default().fg(C_SHARE),
                )),
                Line::from(""),
                key_row("y / Enter", "copy link"),
                key_row("Esc", "close"),
            ];
            draw_popup(frame, area, "download / install", lines, 80);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use vibe_proto::config::ArtistConfig;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_with(current: bool) -> AppState {
        let mut s = AppState::new(ArtistConfig::default(), false);
        let song = Song {
            id: "9".into(),
            title: "Luar".into(),
            audio_url: Some("https://cdn/luar.mp3".into()),
            ..Default::default()
        };
        s.player.songs = vec![song.clone()];
        if current {
            s.player.current_song = Some(song);
        }
        s
    }

    fn open(detail: &mut SongDetail, state: &AppState, id: &str) {
        detail.on_action(&Action::RouteChanged(Route::Song(id.into())), state);
    }

    #[test]
    fn test_seek_only_for_current_song() {
        let mut detail = SongDetail::new();
        let st = state_with(false);
        open(&mut detail, &st, "9");
        assert!(detail.handle_key(key(KeyCode::Right), &st).is_empty());

        let st = state_with(true);
        let actions = detail.handle_key(key(KeyCode::Right), &st);
        assert!(matches!(actions.as_slice(), [Action::SeekRelative(s)] if *s == SEEK_STEP));
    }

    #[test]
    fn test_enter_plays_song() {
        let mut detail = SongDetail::new();
        let st = state_with(false);
        open(&mut detail, &st, "9");
        let actions = detail.handle_key(key(KeyCode::Enter), &st);
        assert!(matches!(actions.as_slice(), [Action::Play(id)] if id == "9"));
    }

    #[test]
    fn test_unknown_id_falls_back_to_current_song() {
        let mut detail = SongDetail::new();
        let st = state_with(true);
        open(&mut detail, &st, "missing");
        assert_eq!(detail.song(&st).map(|s| s.id.as_str()), Some("9"));

        let st = state_with(false);
        assert!(detail.song(&st).is_none());
        assert!(detail.handle_key(key(KeyCode::Enter), &st).is_empty());
    }

    #[test]
    fn test_share_overlay_copies_link() {
        let mut detail = SongDetail::new();
        let st = state_with(false);
        open(&mut detail, &st, "9");
        assert!(detail.handle_key(key(KeyCode::Char('S')), &st).is_empty());
        assert!(detail.share_open);
        assert!(detail.handle_key(key(KeyCode::Char('l')), &st).is_empty());
        let actions = detail.handle_key(key(KeyCode::Enter), &st);
        assert!(matches!(actions.as_slice(), [Action::CopyToClipboard(_)]));
        assert!(!detail.share_open);
    }

    #[test]
    fn test_download_copies_audio_url() {
        let mut detail = SongDetail::new();
        let st = state_with(false);
        open(&mut detail, &st, "9");
        let actions = detail.handle_key(key(KeyCode::Char('d')), &st);
        assert!(
            matches!(actions.as_slice(), [Action::CopyToClipboard(u)] if u == "https://cdn/luar.mp3")
        );
    }
}
