//! Bottom rows: key hints for the current mode and the last core log line.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::router::Route;
use crate::theme::{C_ERROR, C_LIME, C_MODE_FILTER, C_MODE_FORM, C_MODE_NORMAL, C_MUTED};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into a list search bar.
    Filter,
    /// Typing into an admin form.
    Form,
    /// Typing a path into the `:` prompt.
    Command,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Filter => "SEARCH",
            Self::Form => "EDIT",
            Self::Command => "GOTO",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Filter => C_MODE_FILTER,
            Self::Form | Self::Command => C_MODE_FORM,
        }
    }

    /// Single-letter shortcuts only fire in normal mode.
    pub fn is_text_entry(self) -> bool {
        self != Self::Normal
    }
}

fn hints(mode: InputMode, route: &Route) -> &'static str {
    match mode {
        InputMode::Filter => "type to search  ↑↓ move  Enter keep  Esc clear+close",
        InputMode::Form => "Tab/↑↓ field  Ctrl+S save  Esc cancel",
        InputMode::Command => "type a path (/music, /song/<id>, /admin)  Enter go  Esc cancel",
        InputMode::Normal => match route {
            Route::Welcome => "Enter explore  1-4 sections  : go to  ? help  q quit",
            Route::Song(_) => {
                "Enter play/pause  ←→ seek  l like  S share  d copy audio link  Esc back  ? help"
            }
            Route::Admin => "↑↓ select  a add  e edit  d delete  x logout  Esc back  ? help",
            Route::Bio => "c copy contact  S share app  Tab focus  1-4 sections  ? help",
            _ => {
                "↑↓ select  Enter play  o open  l like  / search  Space pause  n/p next/prev  Tab focus  ? help  q quit"
            }
        },
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, route: &Route) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(hints(mode, route), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// One row: mpv badge (if unhealthy) and the last warning from the core.
pub fn draw_log_bar(frame: &mut Frame, area: Rect, badge: Option<&str>, last_log: Option<&str>) {
    let mut spans = Vec::new();
    match badge {
        Some(b) => spans.push(Span::styled(
            format!(" mpv {} ", b),
            Style::default().fg(C_ERROR).add_modifier(Modifier::BOLD),
        )),
        None => spans.push(Span::styled(" ● ", Style::default().fg(C_LIME))),
    }
    if let Some(log) = last_log {
        spans.push(Span::styled(log, Style::default().fg(C_MUTED)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_normal_mode_allows_shortcuts() {
        assert!(!InputMode::Normal.is_text_entry());
        assert!(InputMode::Filter.is_text_entry());
        assert!(InputMode::Form.is_text_entry());
        assert!(InputMode::Command.is_text_entry());
    }

    #[test]
    fn test_hints_follow_route() {
        assert!(hints(InputMode::Normal, &Route::Song("1".into())).contains("seek"));
        assert!(hints(InputMode::Normal, &Route::Admin).contains("logout"));
        assert!(hints(InputMode::Form, &Route::Admin).contains("Ctrl+S"));
    }
}
