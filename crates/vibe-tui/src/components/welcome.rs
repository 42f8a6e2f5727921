//! Welcome component: the splash page at `/`.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    router::Route,
    theme::{style_button, style_button_focused, style_secondary, C_LIME, C_PRIMARY},
};

pub struct Welcome;

impl Component for Welcome {
    fn id(&self) -> ComponentId {
        ComponentId::Welcome
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char('e') => vec![Action::Navigate(Route::Home)],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => vec![Action::Navigate(Route::Home)],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let top = area.height.saturating_sub(9) / 2;
        let mut lines: Vec<Line> = (0..top).map(|_| Line::from("")).collect();
        lines.extend([
            Line::from(Span::styled(
                "A Vibe",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Musical.",
                Style::default().fg(C_LIME).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(state.artist.tagline.clone(), style_secondary())),
            Line::from(""),
            Line::from(""),
            Line::from(Span::styled(
                "  explore works  →  ",
                if focused {
                    style_button_focused()
                } else {
                    style_button()
                },
            )),
        ]);
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use vibe_proto::config::ArtistConfig;

    #[test]
    fn test_enter_explores() {
        let st = AppState::new(ArtistConfig::default(), false);
        let actions = Welcome.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &st);
        assert!(matches!(actions.as_slice(), [Action::Navigate(Route::Home)]));
    }
}
