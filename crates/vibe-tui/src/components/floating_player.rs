//! FloatingPlayer component: mini player docked above the bottom nav.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;
use vibe_proto::PlaybackStatus;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    intent::RenderHint,
    router::Route,
    theme::{C_LIME, C_LOADING, C_MUTED, C_PRIMARY, C_SECONDARY, C_SEPARATOR},
    widgets::{pane_chrome::pane_chrome, progress_bar::bar_cells, song_row::truncate},
};

/// Width of the `⏮ ▶ ⏭` control strip at the right edge.
const CONTROLS_W: u16 = 9;

pub struct FloatingPlayer;

impl FloatingPlayer {
    fn play_glyph(state: &AppState) -> (&'static str, Style) {
        let style = Style::default().fg(C_LIME).add_modifier(Modifier::BOLD);
        match state.pause_hint {
            RenderHint::PendingHidden => return (" ", style),
            RenderHint::TimedOut => return ("?", Style::default().fg(C_MUTED)),
            _ => {}
        }
        match state.player.playback_status {
            PlaybackStatus::Loading => ("…", Style::default().fg(C_LOADING)),
            _ if state.player.is_playing => ("‖", style),
            _ => ("▶", style),
        }
    }
}

impl Component for FloatingPlayer {
    fn id(&self) -> ComponentId {
        ComponentId::FloatingPlayer
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let Some(id) = state.player.current_id() else {
            return vec![];
        };
        match key.code {
            KeyCode::Enter | KeyCode::Char('o') => vec![Action::Navigate(Route::Song(id.to_string()))],
            KeyCode::Left => vec![Action::Prev],
            KeyCode::Right => vec![Action::Next],
            _ => vec![],
        }
    }

    /// Clicks on the control strip drive playback; anywhere else opens the
    /// song page.
    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        let MouseEventKind::Down(MouseButton::Left) = event.kind else {
            return vec![];
        };
        let Some(id) = state.player.current_id() else {
            return vec![];
        };
        let right = area.x + area.width.saturating_sub(1);
        let strip_start = right.saturating_sub(CONTROLS_W);
        if event.column < strip_start {
            return vec![Action::Navigate(Route::Song(id.to_string()))];
        }
        match (event.column - strip_start) / 3 {
            0 => vec![Action::Prev],
            1 => vec![Action::TogglePause],
            _ => vec![Action::Next],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let Some(song) = state.current_song() else {
            return;
        };
        let block = pane_chrome("playing", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 || inner.width < CONTROLS_W + 4 {
            return;
        }

        let text_w = (inner.width - CONTROLS_W - 1) as usize;
        let title = truncate(&song.title, text_w);
        let author = truncate(&song.author, text_w.saturating_sub(title.width() + 3));
        let pad = text_w.saturating_sub(title.width() + author.width() + 3);
        let (glyph, glyph_style) = Self::play_glyph(state);
        let line = Line::from(vec![
            Span::styled(
                format!(" {}", title),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" · ", Style::default().fg(C_MUTED)),
            Span::styled(author, Style::default().fg(C_SECONDARY)),
            Span::raw(" ".repeat(pad)),
            Span::styled(" ⏮ ", Style::default().fg(C_SECONDARY)),
            Span::styled(format!(" {} ", glyph), glyph_style),
            Span::styled(" ⏭ ", Style::default().fg(C_SECONDARY)),
        ]);
        frame.render_widget(Paragraph::new(line), Rect { height: 1, ..inner });

        // thin progress line under the title when there is room
        if inner.height > 1 {
            let bar = bar_cells(state.player.progress_ratio(), inner.width as usize);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(bar, Style::default().fg(C_LIME))))
                    .style(Style::default().bg(C_SEPARATOR)),
                Rect {
                    y: inner.y + 1,
                    height: 1,
                    ..inner
                },
            );
        }
    }

    fn min_height(&self) -> u16 {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyModifiers, MouseEvent};
    use vibe_proto::config::ArtistConfig;
    use vibe_proto::Song;

    fn state() -> AppState {
        let mut st = AppState::new(ArtistConfig::default(), false);
        st.player.current_song = Some(Song {
            id: "4".into(),
            title: "Lua".into(),
            ..Default::default()
        });
        st
    }

    fn click(column: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row: 1,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_enter_opens_current_song() {
        let st = state();
        let actions =
            FloatingPlayer.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &st);
        assert!(matches!(actions.as_slice(), [Action::Navigate(Route::Song(id))] if id == "4"));
    }

    #[test]
    fn test_click_regions() {
        let st = state();
        let area = Rect::new(0, 0, 40, 4);
        // strip spans columns 30..39
        assert!(matches!(
            FloatingPlayer.handle_mouse(click(5), area, &st).as_slice(),
            [Action::Navigate(_)]
        ));
        assert!(matches!(
            FloatingPlayer.handle_mouse(click(31), area, &st).as_slice(),
            [Action::Prev]
        ));
        assert!(matches!(
            FloatingPlayer.handle_mouse(click(34), area, &st).as_slice(),
            [Action::TogglePause]
        ));
        assert!(matches!(
            FloatingPlayer.handle_mouse(click(37), area, &st).as_slice(),
            [Action::Next]
        ));
    }

    #[test]
    fn test_nothing_without_current_song() {
        let st = AppState::new(ArtistConfig::default(), false);
        assert!(FloatingPlayer
            .handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &st)
            .is_empty());
    }
}
