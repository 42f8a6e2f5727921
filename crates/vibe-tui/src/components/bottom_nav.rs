//! BottomNav component: the four section tabs.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    router::{nav_item_active, Route, NAV_ITEMS},
    theme::{C_LIME, C_MUTED, C_NUMBER_HINT, C_SELECTION_BG},
    widgets::pane_chrome::pane_chrome,
};

pub struct BottomNav {
    /// Highlighted tab while the nav has focus.
    cursor: usize,
}

impl BottomNav {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    fn navigate(index: usize) -> Vec<Action> {
        NAV_ITEMS
            .get(index)
            .and_then(|item| Route::parse(item.path))
            .map(|route| vec![Action::Navigate(route)])
            .unwrap_or_default()
    }

    fn tab_areas(inner: Rect) -> Vec<Rect> {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, NAV_ITEMS.len() as u32); NAV_ITEMS.len()])
            .split(inner)
            .to_vec()
    }
}

impl Default for BottomNav {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for BottomNav {
    fn id(&self) -> ComponentId {
        ComponentId::BottomNav
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.cursor = (self.cursor + 1).min(NAV_ITEMS.len() - 1);
            }
            KeyCode::Enter => return Self::navigate(self.cursor),
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        let MouseEventKind::Down(MouseButton::Left) = event.kind else {
            return vec![];
        };
        let inner = pane_chrome("", false, None).inner(area);
        let pos = (event.column, event.row).into();
        match Self::tab_areas(inner).iter().position(|r| r.contains(pos)) {
            Some(i) => {
                self.cursor = i;
                Self::navigate(i)
            }
            None => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::RouteChanged(route) = action {
            let path = route.path();
            if let Some(i) = NAV_ITEMS.iter().position(|it| nav_item_active(it.path, &path)) {
                self.cursor = i;
            }
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("", focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let path = state.path();
        for (i, (item, rect)) in NAV_ITEMS.iter().zip(Self::tab_areas(inner)).enumerate() {
            let active = nav_item_active(item.path, &path);
            let mut style = if active {
                Style::default().fg(C_LIME).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(C_MUTED)
            };
            if focused && i == self.cursor {
                style = style.bg(C_SELECTION_BG);
            }
            let line = Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(C_NUMBER_HINT)),
                Span::styled(format!("{} {}", item.icon, item.label), style),
            ])
            .centered();
            frame.render_widget(Paragraph::new(line), rect);
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
    fn test_cursor_follows_route_and_enter_navigates() {
        let st = AppState::new(ArtistConfig::default(), false);
        let mut nav = BottomNav::new();
        nav.on_action(&Action::RouteChanged(Route::Music), &st);
        assert_eq!(nav.cursor, 2);
        nav.handle_key(key(KeyCode::Right), &st);
        let actions = nav.handle_key(key(KeyCode::Enter), &st);
        assert!(matches!(actions.as_slice(), [Action::Navigate(Route::Favorites)]));
        // clamps at the last tab
        nav.handle_key(key(KeyCode::Right), &st);
        assert_eq!(nav.cursor, 3);
    }

    #[test]
    fn test_click_selects_tab() {
        let st = AppState::new(ArtistConfig::default(), false);
        let mut nav = BottomNav::new();
        let event = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 2,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        let actions = nav.handle_mouse(event, Rect::new(0, 0, 42, 3), &st);
        assert!(matches!(actions.as_slice(), [Action::Navigate(Route::Home)]));
    }
}
