//! Color palette and style constants for the vibe TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(10, 10, 12);
pub const C_SURFACE: Color = Color::Rgb(27, 28, 32);
pub const C_SURFACE_DARK: Color = Color::Rgb(18, 19, 15);
pub const C_LIME: Color = Color::Rgb(212, 248, 94);
pub const C_LIME_HOVER: Color = Color::Rgb(189, 231, 44);
pub const C_PURPLE: Color = Color::Rgb(215, 161, 249);
pub const C_PURPLE_DEEP: Color = Color::Rgb(162, 115, 245);
pub const C_SHARE: Color = Color::Rgb(37, 211, 102);
pub const C_HEART: Color = Color::Rgb(239, 68, 68);
pub const C_LOADING: Color = Color::Rgb(255, 184, 80);
pub const C_ERROR: Color = Color::Rgb(248, 113, 113);
pub const C_MUTED: Color = Color::Rgb(100, 116, 139);
pub const C_SEPARATOR: Color = Color::Rgb(40, 41, 50);
pub const C_SECONDARY: Color = Color::Rgb(148, 163, 184);
pub const C_PRIMARY: Color = Color::Rgb(241, 245, 249);
pub const C_SELECTION_BG: Color = Color::Rgb(40, 41, 50);
pub const C_PANEL_BORDER: Color = Color::Rgb(40, 41, 50);
pub const C_PANEL_BORDER_FOCUSED: Color = C_LIME;
pub const C_NUMBER_HINT: Color = Color::Rgb(90, 98, 115);
pub const C_FILTER_BG: Color = Color::Rgb(18, 19, 15);
pub const C_FILTER_FG: Color = C_LIME;
pub const C_TOAST_INFO: Color = Color::Rgb(96, 165, 250);
pub const C_TOAST_SUCCESS: Color = C_LIME;
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(248, 113, 113);
pub const C_BADGE_ERR: Color = Color::Rgb(248, 113, 113);
pub const C_BADGE_PENDING: Color = Color::Rgb(255, 184, 80);
pub const C_MODE_NORMAL: Color = C_SECONDARY;
pub const C_MODE_FILTER: Color = C_LIME;
pub const C_MODE_FORM: Color = C_PURPLE;

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_title() -> Style {
    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Lime call-to-action button.
pub fn style_button() -> Style {
    Style::default()
        .fg(C_SURFACE_DARK)
        .bg(C_LIME)
        .add_modifier(Modifier::BOLD)
}

pub fn style_button_focused() -> Style {
    Style::default()
        .fg(C_SURFACE_DARK)
        .bg(C_LIME_HOVER)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn style_selected() -> Style {
    Style::default().bg(C_SELECTION_BG).fg(C_PRIMARY)
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}
