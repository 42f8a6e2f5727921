//! Song catalog storage.
//!
//! Two seams: [`SongStore`] for the song table and [`MediaStore`] for audio
//! and cover files. [`RestCatalog`] talks to a hosted PostgREST + storage
//! backend; [`LocalCatalog`] keeps everything in a TOML file and a media
//! directory for running without one.

mod error;
mod local;
mod rest;
pub mod submit;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::song::{Song, SongDraft, SongPatch};

pub use error::{CatalogError, Result};
pub use local::LocalCatalog;
pub use rest::RestCatalog;

#[async_trait]
pub trait SongStore: Send + Sync {
    /// All songs, newest first.
    async fn list_songs(&self) -> Result<Vec<Song>>;

    async fn insert_song(&self, draft: &SongDraft) -> Result<Song>;

    async fn update_song(&self, id: &str, patch: &SongPatch) -> Result<()>;

    async fn delete_song(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under `object_path` (e.g. `audios/audio-1700000000000.mp3`)
    /// and return the URL the player can fetch it from.
    async fn upload(&self, object_path: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String>;
}

/// Store handles shared between the player core and the admin panel.
#[derive(Clone)]
pub struct Stores {
    pub songs: Arc<dyn SongStore>,
    pub media: Arc<dyn MediaStore>,
}

impl Stores {
    /// Remote backend when a URL is configured, local catalog otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.backend.is_remote() {
            let rest = Arc::new(RestCatalog::new(&config.backend)?);
            tracing::info!(url = %config.backend.url, "using remote catalog");
            Ok(Self {
                songs: rest.clone(),
                media: rest,
            })
        } else {
            let local = Arc::new(LocalCatalog::new(
                config.catalog.songs_toml.clone(),
                config.catalog.media_dir.clone(),
            ));
            tracing::info!(
                path = %config.catalog.songs_toml.display(),
                "no backend url configured, using local catalog"
            );
            Ok(Self {
                songs: local.clone(),
                media: local,
            })
        }
    }
}
