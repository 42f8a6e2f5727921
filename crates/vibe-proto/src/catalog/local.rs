//! File-backed catalog: songs in a TOML file, media in a directory.
//!
//! ```toml
//! [[song]]
//! id = "1"
//! title = "Caminho"
//! author = "Paulo Oliveira"
//! audio_url = "/home/me/music/caminho.mp3"
//! ```

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{CatalogError, MediaStore, Result, SongStore};
use crate::song::{sort_newest_first, Song, SongDraft, SongPatch};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SongFile {
    #[serde(default)]
    song: Vec<Song>,
}

pub struct LocalCatalog {
    songs_toml: PathBuf,
    media_dir: PathBuf,
    /// Serialises read-modify-write cycles on the TOML file.
    write_lock: Mutex<()>,
}

impl LocalCatalog {
    pub fn new(songs_toml: PathBuf, media_dir: PathBuf) -> Self {
        Self {
            songs_toml,
            media_dir,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_file(&self) -> Result<SongFile> {
        match tokio::fs::read_to_string(&self.songs_toml).await {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CatalogError::Parse(format!("{}: {}", self.songs_toml.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SongFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, file: &SongFile) -> Result<()> {
        if let Some(parent) = self.songs_toml.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(file)
            .map_err(|e| CatalogError::Parse(format!("serialize catalog: {}", e)))?;
        tokio::fs::write(&self.songs_toml, content).await?;
        Ok(())
    }
}

/// One past the largest numeric id; non-numeric ids are ignored.
fn next_id(songs: &[Song]) -> String {
    songs
        .iter()
        .filter_map(|s| s.id.parse::<u64>().ok())
        .max()
        .map_or(1, |n| n + 1)
        .to_string()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

#[async_trait]
impl SongStore for LocalCatalog {
    async fn list_songs(&self) -> Result<Vec<Song>> {
        let mut songs = self.read_file().await?.song;
        sort_newest_first(&mut songs);
        debug!(count = songs.len(), path = %self.songs_toml.display(), "local catalog read");
        Ok(songs)
    }

    async fn insert_song(&self, draft: &SongDraft) -> Result<Song> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read_file().await?;
        let song = Song {
            id: next_id(&file.song),
            title: draft.title.clone(),
            author: draft.author.clone(),
            audio_url: Some(draft.audio_url.clone()),
            cover: Some(draft.cover.clone()),
            lyrics: non_empty(&draft.lyrics),
            isrc: non_empty(&draft.isrc),
            created_at: Some(Utc::now()),
        };
        file.song.push(song.clone());
        self.write_file(&file).await?;
        info!(id = %song.id, title = %song.title, "song added to local catalog");
        Ok(song)
    }

    async fn update_song(&self, id: &str, patch: &SongPatch) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read_file().await?;
        let song = file
            .song
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        song.title = patch.title.clone();
        song.isrc = non_empty(&patch.isrc);
        song.lyrics = non_empty(&patch.lyrics);
        song.audio_url = non_empty(&patch.audio_url);
        song.cover = Some(patch.cover.clone());
        self.write_file(&file).await?;
        info!(id = %id, "local song updated");
        Ok(())
    }

    async fn delete_song(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read_file().await?;
        let before = file.song.len();
        file.song.retain(|s| s.id != id);
        if file.song.len() == before {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        self.write_file(&file).await?;
        info!(id = %id, "local song deleted");
        Ok(())
    }
}

#[async_trait]
impl MediaStore for LocalCatalog {
    async fn upload(
        &self,
        object_path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String> {
        let dest = self.media_dir.join(Path::new(object_path));
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&dest, &bytes).await?;
        info!(path = %dest.display(), size = bytes.len(), "media stored locally");
        Ok(dest.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(&[]), "1");
        let songs = vec![
            Song {
                id: "4".into(),
                ..Default::default()
            },
            Song {
                id: "uuid-ish".into(),
                ..Default::default()
            },
            Song {
                id: "9".into(),
                ..Default::default()
            },
        ];
        assert_eq!(next_id(&songs), "10");
    }

    #[test]
    fn test_parses_hand_written_file() {
        let file: SongFile = toml::from_str(
            r#"
            [[song]]
            id = 3
            title = "Caminho"
            audio_url = "/music/caminho.mp3"

            [[song]]
            id = "x"
            title = "Sem audio"
            "#,
        )
        .unwrap();
        assert_eq!(file.song.len(), 2);
        assert_eq!(file.song[0].id, "3");
        assert!(!file.song[1].has_audio());
    }
}
