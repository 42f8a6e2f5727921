pub mod catalog;
pub mod config;
pub mod platform;
pub mod protocol;
pub mod song;
pub mod state;

pub use catalog::{CatalogError, MediaStore, SongStore};
pub use config::Config;
pub use protocol::{CatalogStatus, Command, MpvHealth, PlaybackStatus, PlayerState};
pub use song::{format_remaining, format_time, Song, SongDraft, SongPatch};
pub use state::StateManager;
