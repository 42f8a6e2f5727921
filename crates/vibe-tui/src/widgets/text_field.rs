//! Labelled single-line text field used by the admin forms and the path
//! prompt.

use ratatui::crossterm::event::{Event, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_LIME, C_MUTED, C_PRIMARY, C_SECONDARY, C_SURFACE_DARK};

pub struct TextField {
    pub label: &'static str,
    placeholder: &'static str,
    input: Input,
    masked: bool,
}

impl TextField {
    pub fn new(label: &'static str, placeholder: &'static str) -> Self {
        Self {
            label,
            placeholder,
            input: Input::default(),
            masked: false,
        }
    }

    /// Render every character as a bullet.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.input = Input::new(value.into());
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    /// Feed a key to the editor.
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.input.handle_event(&Event::Key(key));
    }

    fn shown(&self, scroll: usize) -> String {
        if self.masked {
            "•".repeat(self.input.value().chars().count().saturating_sub(scroll))
        } else {
            self.input.value().chars().skip(scroll).collect()
        }
    }

    /// Two rows: the label, then the value on a dark strip.
    pub fn draw(&self, frame: &mut Frame, area: Rect, focused: bool) {
        if area.height == 0 {
            return;
        }
        let label_style = if focused {
            Style::default().fg(C_LIME).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(format!(" {}", self.label), label_style))),
            Rect { height: 1, ..area },
        );
        if area.height < 2 {
            return;
        }
        let value_area = Rect {
            y: area.y + 1,
            height: 1,
            ..area
        };
        let width = value_area.width.saturating_sub(3) as usize;
        let scroll = self.input.visual_scroll(width);
        let span = if self.input.value().is_empty() {
            Span::styled(format!("  {}", self.placeholder), Style::default().fg(C_MUTED))
        } else {
            Span::styled(format!("  {}", self.shown(scroll)), Style::default().fg(C_PRIMARY))
        };
        frame.render_widget(
            Paragraph::new(Line::from(span)).style(Style::default().bg(C_SURFACE_DARK)),
            value_area,
        );
        if focused && value_area.width > 2 {
            let x = value_area.x + 2 + self.input.visual_cursor().saturating_sub(scroll) as u16;
            frame.set_cursor_position((x.min(value_area.x + value_area.width - 1), value_area.y));
        }
    }
}

/// Lyrics are typed on one line with `\n` for line breaks.
pub fn decode_line_breaks(text: &str) -> String {
    text.replace("\\n", "\n")
}

pub fn encode_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_typing_and_backspace() {
        let mut f = TextField::new("Title", "");
        for c in "abc".chars() {
            f.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
        f.handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(f.value(), "ab");
    }

    #[test]
    fn test_mask_hides_value() {
        let mut f = TextField::new("Password", "").masked();
        f.set_value("secret");
        assert_eq!(f.shown(0), "••••••");
        assert_eq!(f.value(), "secret");
    }

    #[test]
    fn test_line_break_escapes() {
        let lyrics = "first line\nsecond line";
        assert_eq!(encode_line_breaks(lyrics), "first line\\nsecond line");
        assert_eq!(decode_line_breaks(&encode_line_breaks(lyrics)), lyrics);
    }
}
