//! Toasts: transient messages stacked in the top-right corner. They stand in
//! for blocking alerts: every success or failure of a background operation
//! ends up here.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::theme::{C_SURFACE, C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn color(self) -> Color {
        match self {
            Severity::Info => C_TOAST_INFO,
            Severity::Success => C_TOAST_SUCCESS,
            Severity::Warning => C_TOAST_WARNING,
            Severity::Error => C_TOAST_ERROR,
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Severity::Info => "·",
            Severity::Success => "✓",
            Severity::Warning => "!",
            Severity::Error => "✗",
        }
    }

    fn lifetime(self) -> Duration {
        match self {
            Severity::Info | Severity::Success => Duration::from_secs(3),
            Severity::Warning => Duration::from_secs(4),
            Severity::Error => Duration::from_secs(6),
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    /// Message and animation frame of the persistent spinner.
    spinner: Option<(String, usize)>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            spinner: None,
            max_visible: 4,
        }
    }

    /// Re-pushing a message already on screen refreshes it instead of
    /// stacking a duplicate.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        self.toasts.retain(|t| t.message != message);
        self.toasts.push_back(Toast {
            message,
            severity,
            expires: Instant::now() + severity.lifetime(),
        });
        while self.toasts.len() > self.max_visible * 2 {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    /// Show a spinner that stays until `resolve_spinner` or `dismiss_spinner`.
    pub fn spinner(&mut self, message: impl Into<String>) {
        self.spinner = Some((message.into(), 0));
    }

    pub fn resolve_spinner(&mut self, severity: Severity, message: impl Into<String>) {
        self.spinner = None;
        self.push(severity, message);
    }

    pub fn dismiss_spinner(&mut self) {
        self.spinner = None;
    }

    pub fn has_spinner(&self) -> bool {
        self.spinner.is_some()
    }

    /// Drop expired toasts and advance the spinner. Call every 100ms.
    pub fn tick(&mut self) {
        self.expire(Instant::now());
        if let Some((_, frame)) = self.spinner.as_mut() {
            *frame = (*frame + 1) % SPINNER_FRAMES.len();
        }
    }

    fn expire(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires > now);
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty() && self.spinner.is_none()
    }

    /// Rows to draw, top to bottom: spinner first, then newest toasts.
    fn rows(&self) -> Vec<(String, Color)> {
        let mut rows = Vec::new();
        if let Some((message, frame)) = &self.spinner {
            rows.push((
                format!(" {} {} ", SPINNER_FRAMES[*frame % SPINNER_FRAMES.len()], message),
                C_TOAST_INFO,
            ));
        }
        rows.extend(
            self.toasts
                .iter()
                .rev()
                .take(self.max_visible)
                .map(|t| (format!(" {} {} ", t.severity.icon(), t.message), t.severity.color())),
        );
        rows
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if self.is_empty() || area.height < 2 {
            return;
        }
        let max_width = (area.width / 2).clamp(30.min(area.width), 64);
        let bottom = area.y + area.height;

        for (i, (text, color)) in self.rows().into_iter().enumerate() {
            let y = area.y + 1 + i as u16;
            if y >= bottom {
                break;
            }
            let w = (text.width() as u16).min(max_width);
            let toast_area = Rect {
                x: area.x + area.width.saturating_sub(w + 1),
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, toast_area);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    text,
                    Style::default()
                        .fg(color)
                        .bg(C_SURFACE)
                        .add_modifier(Modifier::BOLD),
                ))),
                toast_area,
            );
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_messages_collapse() {
        let mut t = ToastManager::new();
        t.error("upload failed");
        t.info("saved");
        t.error("upload failed");
        let rows = t.rows();
        assert_eq!(rows.len(), 2);
        // newest first
        assert!(rows[0].0.contains("upload failed"));
    }

    #[test]
    fn test_spinner_sits_on_top_until_resolved() {
        let mut t = ToastManager::new();
        t.info("catalog loaded");
        t.spinner("saving song");
        assert!(t.rows()[0].0.contains("saving song"));

        t.resolve_spinner(Severity::Success, "song saved");
        assert!(!t.has_spinner());
        let rows = t.rows();
        assert!(rows[0].0.contains("song saved"));
        assert_eq!(rows[0].1, C_TOAST_SUCCESS);
    }

    #[test]
    fn test_expiry() {
        let mut t = ToastManager::new();
        t.warning("mpv restarting");
        t.expire(Instant::now() + Duration::from_secs(10));
        assert!(t.is_empty());
    }

    #[test]
    fn test_visible_rows_are_capped() {
        let mut t = ToastManager::new();
        for i in 0..20 {
            t.info(format!("message {}", i));
        }
        assert_eq!(t.rows().len(), 4);
    }
}
