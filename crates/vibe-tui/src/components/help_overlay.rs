//! HelpOverlay component: centered popup with the key reference.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PRIMARY},
    widgets::popup::{draw_popup, key_row},
};

pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        format!(" {}", title),
        Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
    ))
}

impl Component for HelpOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::HelpOverlay
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => vec![Action::ToggleHelp],
            // everything else is swallowed while open
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleHelp = action {
            self.toggle();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        if !self.visible {
            return;
        }
        let lines = vec![
            Line::from(Span::styled(
                " keyboard shortcuts",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            section("playback"),
            key_row("enter", "play selected (pauses if current)"),
            key_row("space", "play / pause"),
            key_row("n / p / r", "next / previous / random"),
            key_row("s", "stop"),
            key_row("- / +", "volume down / up"),
            key_row(", / .", "seek -10s / +10s"),
            key_row("< / >", "seek -60s / +60s"),
            key_row("l", "like / unlike"),
            Line::from(""),
            section("navigation"),
            key_row("1 2 3 4", "home / bio / music / favorites"),
            key_row("o  or  →", "open song page"),
            key_row("esc / backspace", "back"),
            key_row(":", "go to a path"),
            key_row("tab / shift-tab", "focus next / previous pane"),
            key_row("↑ ↓  j k  g G", "move selection"),
            key_row("J", "jump to current song"),
            Line::from(""),
            section("lists & ui"),
            key_row("/", "search (esc clears + closes)"),
            key_row("y", "copy share link"),
            key_row("S", "share overlay"),
            key_row("R", "reload catalog"),
            key_row("K", "toggle keys bar"),
            key_row("?", "toggle this help"),
            key_row("q / ctrl+c", "quit"),
            Line::from(""),
            Line::from(Span::styled(" press ? or esc to close", Style::default().fg(C_MUTED))),
        ];
        draw_popup(frame, area, "help", lines, 68);
    }
}
