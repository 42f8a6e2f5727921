//! Song records as stored in the catalog backend.
//!
//! The backend table has one row per song; rows are returned newest first.
//! `SongDraft` and `SongPatch` are the insert and update payloads the admin
//! panel sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Song {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
    /// International Standard Recording Code.
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Backend tables use either bigint or uuid primary keys.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}

impl Song {
    /// Cover artwork, falling back to the artist's default picture.
    pub fn cover_or<'a>(&'a self, default_cover: &'a str) -> &'a str {
        match self.cover.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => default_cover,
        }
    }

    pub fn has_audio(&self) -> bool {
        self.audio_url
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty())
    }

    pub fn lyrics_text(&self) -> Option<&str> {
        self.lyrics.as_deref().filter(|l| !l.trim().is_empty())
    }

    /// Case-insensitive match: every whitespace-separated term must appear in
    /// the title, author or ISRC.
    pub fn matches(&self, query: &str) -> bool {
        let haystack = format!(
            "{} {} {}",
            self.title,
            self.author,
            self.isrc.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        query
            .split_whitespace()
            .all(|term| haystack.contains(&term.to_lowercase()))
    }
}

/// Sort newest first. Songs without a creation date go last, keeping their
/// relative order.
pub fn sort_newest_first(songs: &mut [Song]) {
    songs.sort_by(|a, b| match (&a.created_at, &b.created_at) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Insert payload for a new song.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongDraft {
    pub title: String,
    pub author: String,
    pub isrc: Option<String>,
    pub lyrics: Option<String>,
    pub audio_url: String,
    pub cover: String,
}

/// Update payload. The author is fixed at creation and never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongPatch {
    pub title: String,
    pub isrc: Option<String>,
    pub lyrics: Option<String>,
    pub audio_url: Option<String>,
    pub cover: String,
}

/// `m:ss` for a position in seconds. Unknown positions render as `0:00`.
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "0:00".to_string();
    }
    let total = secs.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Remaining time as `-m:ss`.
pub fn format_remaining(progress: f64, duration: f64) -> String {
    let remaining = if duration.is_finite() && progress.is_finite() {
        (duration - progress).max(0.0)
    } else {
        f64::NAN
    };
    format!("-{}", format_time(remaining))
}
