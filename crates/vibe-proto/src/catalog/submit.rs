//! Admin panel save logic: validate the form, upload media, then insert or
//! update the song row.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{CatalogError, MediaStore, Result, SongStore};
use crate::song::{Song, SongDraft, SongPatch};

/// What the admin typed into the add/edit form. File fields are local paths;
/// URL fields are external links that take priority over files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongForm {
    pub title: String,
    pub isrc: String,
    pub lyrics: String,
    pub audio_file: Option<PathBuf>,
    pub audio_url: String,
    pub cover_file: Option<PathBuf>,
    pub cover_url: String,
}

impl SongForm {
    /// Pre-fill from an existing song. Media fields stay blank so that an
    /// untouched field keeps the current file.
    pub fn from_song(song: &Song) -> Self {
        Self {
            title: song.title.clone(),
            isrc: song.isrc.clone().unwrap_or_default(),
            lyrics: song.lyrics.clone().unwrap_or_default(),
            ..Default::default()
        }
    }

    pub fn validate(&self, editing: Option<&Song>) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::Validation("title is required".into()));
        }
        if editing.is_none() && self.audio_file.is_none() && blank(&self.audio_url) {
            return Err(CatalogError::Validation(
                "select an audio file or provide an external audio URL".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Song),
    Updated { id: String },
}

/// Names and branding applied to new rows.
#[derive(Debug, Clone)]
pub struct SubmitContext<'a> {
    pub author: &'a str,
    pub default_cover: &'a str,
    /// Millisecond timestamp used to name uploaded objects.
    pub now_millis: i64,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn optional(s: &str) -> Option<String> {
    (!blank(s)).then(|| s.trim().to_string())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "mp3" => "audio/mpeg",
        "m4a" | "aac" => "audio/mp4",
        "wav" => "audio/wav",
        "ogg" | "oga" | "opus" => "audio/ogg",
        "flac" => "audio/flac",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Read a local file and hand it to the media store as `{prefix}-{millis}.{ext}`
/// under `folder`.
async fn upload_file(
    media: &dyn MediaStore,
    path: &Path,
    folder: &str,
    prefix: &str,
    now_millis: i64,
) -> Result<String> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CatalogError::FileNotFound(path.display().to_string())
        } else {
            CatalogError::Io(e)
        }
    })?;
    let ext = extension(path);
    let object_path = format!("{}/{}-{}.{}", folder, prefix, now_millis, ext);
    debug!(file = %path.display(), object = %object_path, "uploading form file");
    media
        .upload(&object_path, bytes, content_type_for(&ext))
        .await
}

/// Save the form. `editing` is the song being edited, if any.
pub async fn submit_song(
    songs: &dyn SongStore,
    media: &dyn MediaStore,
    form: &SongForm,
    editing: Option<&Song>,
    ctx: &SubmitContext<'_>,
) -> Result<SubmitOutcome> {
    form.validate(editing)?;

    let audio_url = if let Some(url) = optional(&form.audio_url) {
        Some(url)
    } else if let Some(path) = &form.audio_file {
        Some(upload_file(media, path, "audios", "audio", ctx.now_millis).await?)
    } else {
        editing.and_then(|s| s.audio_url.clone())
    };

    let cover = if let Some(url) = optional(&form.cover_url) {
        url
    } else if let Some(path) = &form.cover_file {
        upload_file(media, path, "covers", "cover", ctx.now_millis).await?
    } else {
        editing
            .and_then(|s| s.cover.clone())
            .filter(|c| !blank(c))
            .unwrap_or_else(|| ctx.default_cover.to_string())
    };

    match editing {
        Some(song) => {
            let patch = SongPatch {
                title: form.title.trim().to_string(),
                isrc: optional(&form.isrc),
                lyrics: optional(&form.lyrics),
                audio_url,
                cover,
            };
            songs.update_song(&song.id, &patch).await?;
            info!(id = %song.id, "song saved");
            Ok(SubmitOutcome::Updated {
                id: song.id.clone(),
            })
        }
        None => {
            let draft = SongDraft {
                title: form.title.trim().to_string(),
                author: ctx.author.to_string(),
                isrc: optional(&form.isrc),
                lyrics: optional(&form.lyrics),
                // validate() guarantees one of the audio sources was given
                audio_url: audio_url.unwrap_or_default(),
                cover,
            };
            let song = songs.insert_song(&draft).await?;
            info!(id = %song.id, "song created");
            Ok(SubmitOutcome::Created(song))
        }
    }
}

/// Remove a song row. Uploaded media is left in place.
pub async fn delete_song(songs: &dyn SongStore, id: &str) -> Result<()> {
    songs.delete_song(id).await?;
    info!(id = %id, "song deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LocalCatalog;

    const CTX: SubmitContext<'static> = SubmitContext {
        author: "Paulo Oliveira",
        default_cover: "/imagem_do_autor.png",
        now_millis: 1_700_000_000_000,
    };

    fn catalog(dir: &tempfile::TempDir) -> LocalCatalog {
        LocalCatalog::new(dir.path().join("songs.toml"), dir.path().join("media"))
    }

    #[test]
    fn test_new_song_requires_audio() {
        let form = SongForm {
            title: "Caminho".into(),
            ..Default::default()
        };
        assert!(matches!(
            form.validate(None),
            Err(CatalogError::Validation(_))
        ));
        let editing = Song {
            id: "1".into(),
            ..Default::default()
        };
        assert!(form.validate(Some(&editing)).is_ok());
    }

    #[test]
    fn test_title_required() {
        let form = SongForm {
            title: "   ".into(),
            audio_url: "https://x/a.mp3".into(),
            ..Default::default()
        };
        assert!(form.validate(None).is_err());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("mp3"), "audio/mpeg");
        assert_eq!(content_type_for("png"), "image/png");
        assert_eq!(content_type_for("xyz"), "application/octet-stream");
        assert_eq!(extension(Path::new("/a/B.MP3")), "mp3");
        assert_eq!(extension(Path::new("/a/noext")), "bin");
    }

    #[tokio::test]
    async fn test_external_url_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = catalog(&dir);
        let form = SongForm {
            title: "Caminho".into(),
            audio_url: "https://cdn/caminho.mp3".into(),
            audio_file: Some(dir.path().join("does-not-exist.mp3")),
            ..Default::default()
        };
        let outcome = submit_song(&store, &store, &form, None, &CTX).await.unwrap();
        let SubmitOutcome::Created(song) = outcome else {
            panic!("expected a new song");
        };
        assert_eq!(song.audio_url.as_deref(), Some("https://cdn/caminho.mp3"));
        assert_eq!(song.cover.as_deref(), Some("/imagem_do_autor.png"));
        assert_eq!(song.author, "Paulo Oliveira");
    }

    #[tokio::test]
    async fn test_file_upload_naming() {
        let dir = tempfile::tempdir().unwrap();
        let store = catalog(&dir);
        let audio = dir.path().join("take1.MP3");
        let cover = dir.path().join("art.png");
        std::fs::write(&audio, b"ID3").unwrap();
        std::fs::write(&cover, b"\x89PNG").unwrap();

        let form = SongForm {
            title: "Take".into(),
            audio_file: Some(audio),
            cover_file: Some(cover),
            ..Default::default()
        };
        let SubmitOutcome::Created(song) =
            submit_song(&store, &store, &form, None, &CTX).await.unwrap()
        else {
            panic!("expected a new song");
        };
        let audio_url = song.audio_url.unwrap();
        assert!(audio_url.ends_with("audios/audio-1700000000000.mp3"));
        assert!(song
            .cover
            .unwrap()
            .ends_with("covers/cover-1700000000000.png"));
        assert_eq!(std::fs::read(audio_url).unwrap(), b"ID3");
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = catalog(&dir);
        let form = SongForm {
            title: "Take".into(),
            audio_file: Some(dir.path().join("gone.wav")),
            ..Default::default()
        };
        let err = submit_song(&store, &store, &form, None, &CTX)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound(p) if p.ends_with("gone.wav")));
        assert!(store.list_songs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_keeps_existing_media() {
        let dir = tempfile::tempdir().unwrap();
        let store = catalog(&dir);
        let created = store
            .insert_song(&SongDraft {
                title: "Old".into(),
                author: "Paulo Oliveira".into(),
                isrc: None,
                lyrics: None,
                audio_url: "https://cdn/old.mp3".into(),
                cover: "https://cdn/old.jpg".into(),
            })
            .await
            .unwrap();

        let mut form = SongForm::from_song(&created);
        form.title = "New title".into();
        form.lyrics = "verse one".into();
        let outcome = submit_song(&store, &store, &form, Some(&created), &CTX)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Updated {
                id: created.id.clone()
            }
        );

        let songs = store.list_songs().await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "New title");
        assert_eq!(songs[0].lyrics.as_deref(), Some("verse one"));
        assert_eq!(songs[0].audio_url.as_deref(), Some("https://cdn/old.mp3"));
        assert_eq!(songs[0].cover.as_deref(), Some("https://cdn/old.jpg"));
        assert_eq!(songs[0].author, "Paulo Oliveira");
    }

    #[tokio::test]
    async fn test_delete_song_removes_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = catalog(&dir);
        let form = SongForm {
            title: "Gone".into(),
            audio_url: "https://cdn/gone.mp3".into(),
            ..Default::default()
        };
        let SubmitOutcome::Created(song) = submit_song(&store, &store, &form, None, &CTX)
            .await
            .unwrap()
        else {
            panic!("expected a new song");
        };

        delete_song(&store, &song.id).await.unwrap();
        assert!(store.list_songs().await.unwrap().is_empty());
    }
}
