//! Centered modal boxes: help, share link and delete confirmation.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::{C_PANEL_BORDER, C_PRIMARY, C_SECONDARY, C_SURFACE};

/// `percent_x` of the width, `height` rows, centered in `r`.
pub fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = (r.width as u32 * percent_x.min(100) as u32 / 100) as u16;
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

/// Clears the area under the popup and draws `lines` in a bordered box. The
/// height follows the content.
pub fn draw_popup(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'_>>, percent_x: u16) {
    let height = lines.len() as u16 + 2;
    let popup = centered_rect(percent_x, height, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(C_PANEL_BORDER))
                    .title(Span::styled(
                        format!(" {} ", title),
                        Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                    ))
                    .style(Style::default().bg(C_SURFACE)),
            )
            .wrap(Wrap { trim: false }),
        popup,
    );
}

/// `key  description` row used by help and popups.
pub fn key_row<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{:<16}", key),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, Style::default().fg(C_SECONDARY)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let r = centered_rect(60, 10, outer);
        assert_eq!(r.height, 10);
        assert_eq!(r.width, 60);
        assert_eq!(r.x, 20);
        assert_eq!(r.y, 15);
    }

    #[test]
    fn test_centered_rect_clamps_height() {
        let outer = Rect::new(0, 0, 50, 6);
        let r = centered_rect(80, 20, outer);
        assert!(r.height <= 6);
    }
}
