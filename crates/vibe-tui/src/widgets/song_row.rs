//! One line per song in the home, music and favorites lists.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;
use vibe_proto::{PlayerState, Song};

use crate::theme::{C_HEART, C_LIME, C_MUTED, C_PRIMARY, C_SECONDARY, C_SELECTION_BG};

/// Cut `text` to at most `max` display columns, ending with `…` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// `▶ Title · Author ... ♥`. The current song is lime; a playing one gets a
/// play marker, a paused one a pause marker.
pub fn song_line(song: &Song, player: &PlayerState, selected: bool, width: u16) -> Line<'static> {
    let current = player.is_current(&song.id);
    let marker = if player.is_song_playing(&song.id) {
        "▶ "
    } else if current {
        "‖ "
    } else {
        "  "
    };
    let liked = player.is_liked(&song.id);
    let heart = if liked { " ♥" } else { " ♡" };

    // marker(2) + heart(2) + separator(3)
    let room = (width as usize).saturating_sub(7);
    let title_w = (room * 3 / 5).max(1);
    let title = truncate(&song.title, title_w);
    let author = truncate(&song.author, room.saturating_sub(title.width()));
    let pad = room.saturating_sub(title.width() + author.width());

    let title_style = if current {
        Style::default().fg(C_LIME).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(C_PRIMARY)
    };
    let mut line = Line::from(vec![
        Span::styled(marker, Style::default().fg(C_LIME)),
        Span::styled(title, title_style),
        Span::styled(" · ", Style::default().fg(C_MUTED)),
        Span::styled(author, Style::default().fg(C_SECONDARY)),
        Span::raw(" ".repeat(pad)),
        Span::styled(
            heart,
            Style::default().fg(if liked { C_HEART } else { C_MUTED }),
        ),
    ]);
    if selected {
        line = line.style(Style::default().bg(C_SELECTION_BG));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Saudade do Mar", 8), "Saudade…");
        assert_eq!(truncate("anything", 0), "");
        // wide chars take two columns each
        assert_eq!(truncate("日本語の歌", 5), "日本…");
    }

    #[test]
    fn test_current_song_gets_marker_and_heart() {
        let song = Song {
            id: "7".into(),
            title: "Ventania".into(),
            author: "Paulo Oliveira".into(),
            ..Default::default()
        };
        let mut player = PlayerState::default();
        player.current_song = Some(song.clone());
        player.is_playing = true;
        player.liked = vec!["7".into()];

        let text: String = song_line(&song, &player, false, 60)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.starts_with("▶ Ventania"));
        assert!(text.ends_with('♥'));
    }
}
