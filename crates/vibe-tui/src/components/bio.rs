//! Bio component: the composer's biography, contact and app sharing.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_muted, style_secondary, C_LIME, C_PRIMARY, C_PURPLE, C_SHARE, C_SURFACE_DARK},
    widgets::{
        pane_chrome::pane_chrome,
        popup::{draw_popup, key_row},
        toast::Severity,
    },
};

pub struct Bio {
    share_open: bool,
    scroll: u16,
}

impl Bio {
    pub fn new() -> Self {
        Self {
            share_open: false,
            scroll: 0,
        }
    }

    fn contact(state: &AppState) -> Vec<Action> {
        let url = state.artist.contact_url.trim();
        if url.is_empty() {
            vec![Action::Toast(
                Severity::Warning,
                "no contact link configured".to_string(),
            )]
        } else {
            vec![Action::CopyToClipboard(url.to_string())]
        }
    }

    fn share(state: &AppState) -> Vec<Action> {
        match state.artist.app_share_url() {
            Some(url) => vec![Action::CopyToClipboard(url)],
            None => vec![Action::Toast(
                Severity::Warning,
                "no share link configured".to_string(),
            )],
        }
    }
}

impl Default for Bio {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Bio {
    fn id(&self) -> ComponentId {
        ComponentId::Bio
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if self.share_open {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.share_open = false;
                    return Self::share(state);
                }
                KeyCode::Esc | KeyCode::Char('S') | KeyCode::Char('q') => self.share_open = false,
                _ => {}
            }
            return vec![];
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char('c') => return Self::contact(state),
            KeyCode::Char('S') => self.share_open = true,
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::RouteChanged(_) = action {
            self.share_open = false;
        }
        vec![]
    }

    fn has_modal(&self) -> bool {
        self.share_open
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("biography", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let artist = &state.artist;
        let mut lines = vec![
            Line::from(Span::styled(
                format!(" {}", artist.name),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(" composer", Style::default().fg(C_PURPLE))),
            Line::from(""),
        ];
        for paragraph in artist.bio.lines() {
            lines.push(Line::from(Span::styled(
                format!(" “{}”", paragraph.trim()),
                style_secondary(),
            )));
        }
        lines.extend([
            Line::from(""),
            Line::from(Span::styled(
                " quick contact",
                Style::default().fg(C_LIME).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    " c  message me ",
                    Style::default()
                        .fg(C_SURFACE_DARK)
                        .bg(C_SHARE)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(artist.contact_url.clone(), style_muted()),
            ]),
            Line::from(""),
            Line::from(Span::styled(" S  share the app", style_muted())),
        ]);
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            inner,
        );

        if self.share_open {
            let link = artist
                .app_share_url()
                .unwrap_or_else(|| "no share link configured".to_string());
            let lines = vec![
                Line::from(Span::styled(
                    format!(" {}", link),
                    Style::default().fg(C_SHARE),
                )),
                Line::from(""),
                key_row("y / Enter", "copy link"),
                key_row("Esc", "close"),
            ];
            draw_popup(frame, area, "share app", lines, 80);
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

    #[test]
    fn test_contact_copies_configured_link() {
        let mut artist = ArtistConfig::default();
        artist.contact_url = "https://wa.me/5511999999999".into();
        let st = AppState::new(artist, false);
        let actions = Bio::new().handle_key(key(KeyCode::Char('c')), &st);
        assert!(matches!(actions.as_slice(), [Action::CopyToClipboard(u)] if u.contains("wa.me")));
    }

    #[test]
    fn test_share_without_site_warns() {
        let st = AppState::new(ArtistConfig::default(), false);
        let mut bio = Bio::new();
        bio.handle_key(key(KeyCode::Char('S')), &st);
        let actions = bio.handle_key(key(KeyCode::Enter), &st);
        assert!(matches!(actions.as_slice(), [Action::Toast(Severity::Warning, _)]));
        assert!(!bio.share_open);
    }
}
