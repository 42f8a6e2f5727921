//! Song progress bar: `elapsed ▕████▍    ▏ -remaining`.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use vibe_proto::{format_remaining, format_time};

use crate::theme::{C_LIME, C_MUTED, C_SECONDARY, C_SEPARATOR};

const EIGHTHS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Fill `width` cells for `ratio` (clamped to `0..=1`) with eighth-block
/// precision. Unfilled cells are spaces.
pub fn bar_cells(ratio: f64, width: usize) -> String {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let eighths = (ratio * width as f64 * 8.0).round() as usize;
    let full = (eighths / 8).min(width);
    let mut bar = "█".repeat(full);
    if full < width {
        bar.push(EIGHTHS[eighths % 8]);
        bar.push_str(&" ".repeat(width - full - 1));
    }
    bar
}

/// Renders into one row. Unknown duration shows an empty bar and `-0:00`.
pub fn draw_progress(frame: &mut Frame, area: Rect, progress_secs: f64, duration_secs: Option<f64>) {
    if area.width < 16 || area.height == 0 {
        return;
    }
    let duration = duration_secs.unwrap_or(f64::NAN);
    let left = format_time(progress_secs);
    let right = format_remaining(progress_secs, duration);
    let bar_w = area
        .width
        .saturating_sub((left.len() + right.len() + 4) as u16) as usize;
    let ratio = if duration.is_finite() && duration > 0.0 {
        progress_secs / duration
    } else {
        0.0
    };

    let line = Line::from(vec![
        Span::styled(format!("{} ", left), Style::default().fg(C_SECONDARY)),
        Span::styled("▕", Style::default().fg(C_SEPARATOR)),
        Span::styled(bar_cells(ratio, bar_w), Style::default().fg(C_LIME)),
        Span::styled("▏", Style::default().fg(C_SEPARATOR)),
        Span::styled(format!(" {}", right), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
