use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub artist: ArtistConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub mpv: MpvConfig,
}

/// Remote song table and media bucket. An empty `url` selects the local
/// TOML catalog instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,
    /// Public (anon) API key sent as `apikey` and bearer token.
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_songs_table")]
    pub songs_table: String,
    #[serde(default = "default_media_bucket")]
    pub media_bucket: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Local catalog used when no backend is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_songs_toml")]
    pub songs_toml: PathBuf,
    /// Where uploaded audio and covers are copied to.
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,
}

/// Admin panel credentials. An empty password disables the panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_email")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistConfig {
    #[serde(default = "default_artist_name")]
    pub name: String,
    #[serde(default = "default_tagline")]
    pub tagline: String,
    #[serde(default = "default_bio")]
    pub bio: String,
    #[serde(default)]
    pub contact_url: String,
    #[serde(default = "default_cover")]
    pub default_cover: String,
    /// Public site address used to build share links.
    #[serde(default)]
    pub share_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_enabled")]
    pub enabled: bool,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpvConfig {
    #[serde(default = "default_volume")]
    pub default_volume: f32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            songs_table: default_songs_table(),
            media_bucket: default_media_bucket(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            songs_toml: default_songs_toml(),
            media_dir: default_media_dir(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            email: default_admin_email(),
            password: String::new(),
        }
    }
}

impl Default for ArtistConfig {
    fn default() -> Self {
        Self {
            name: default_artist_name(),
            tagline: default_tagline(),
            bio: default_bio(),
            contact_url: String::new(),
            default_cover: default_cover(),
            share_base_url: String::new(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: default_http_enabled(),
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for MpvConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
        }
    }
}

fn default_songs_table() -> String {
    "songs".to_string()
}

fn default_media_bucket() -> String {
    "msc_media".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_songs_toml() -> PathBuf {
    platform::config_dir().join("songs.toml")
}

fn default_media_dir() -> PathBuf {
    platform::data_dir().join("media")
}

fn default_admin_email() -> String {
    "admin@localhost".to_string()
}

fn default_artist_name() -> String {
    "Paulo Oliveira".to_string()
}

fn default_tagline() -> String {
    "Songs, stories and lyrics".to_string()
}

fn default_bio() -> String {
    "Singer and songwriter. This is where the music lives: \
     every release, its lyrics, and the stories behind them."
        .to_string()
}

fn default_cover() -> String {
    "/imagem_do_autor.png".to_string()
}

fn default_state_file() -> PathBuf {
    platform::data_dir().join("state.json")
}

fn default_http_enabled() -> bool {
    true
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8990
}

fn default_volume() -> f32 {
    0.7
}

impl BackendConfig {
    pub fn is_remote(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl AdminConfig {
    pub fn login_enabled(&self) -> bool {
        !self.password.is_empty()
    }

    /// Plain comparison against the configured pair; email is
    /// case-insensitive.
    pub fn check(&self, email: &str, password: &str) -> bool {
        self.login_enabled()
            && email.trim().eq_ignore_ascii_case(self.email.trim())
            && password == self.password
    }
}

impl ArtistConfig {
    /// Link to a song page, or `None` when no public site is configured.
    pub fn song_share_url(&self, song_id: &str) -> Option<String> {
        let base = self.share_base_url.trim().trim_end_matches('/');
        (!base.is_empty()).then(|| format!("{}/song/{}", base, song_id))
    }

    pub fn app_share_url(&self) -> Option<String> {
        let base = self.share_base_url.trim().trim_end_matches('/');
        (!base.is_empty()).then(|| base.to_string())
    }
}

impl Config {
    /// Load from disk, writing the defaults on first run, then apply the
    /// `VIBE_*` environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            let config = Self::default();
            config.save()?;
            config
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("VIBE_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Some(key) = var("VIBE_BACKEND_KEY") {
            self.backend.anon_key = key;
        }
        if let Some(password) = var("VIBE_ADMIN_PASSWORD") {
            self.admin.password = password;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.http.enabled);
        assert_eq!(config.http.port, 8990);
        assert_eq!(config.backend.songs_table, "songs");
        assert_eq!(config.backend.media_bucket, "msc_media");
        assert!(!config.backend.is_remote());
        assert!(!config.admin.login_enabled());
        assert_eq!(config.artist.default_cover, "/imagem_do_autor.png");
        assert!(config.catalog.songs_toml.ends_with("vibe/songs.toml"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            url = "https://abc.supabase.co"

            [artist]
            share_base_url = "https://vibe.example/"
            "#,
        )
        .unwrap();
        assert!(config.backend.is_remote());
        assert_eq!(config.backend.media_bucket, "msc_media");
        assert_eq!(config.artist.name, "Paulo Oliveira");
        assert_eq!(
            config.artist.song_share_url("42").as_deref(),
            Some("https://vibe.example/song/42")
        );
        assert_eq!(
            config.artist.app_share_url().as_deref(),
            Some("https://vibe.example")
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "VIBE_BACKEND_URL" => Some("https://env.example".to_string()),
            "VIBE_ADMIN_PASSWORD" => Some("s3cret".to_string()),
            _ => None,
        });
        assert_eq!(config.backend.url, "https://env.example");
        assert!(config.backend.anon_key.is_empty());
        assert!(config.admin.check("ADMIN@localhost", "s3cret"));
    }

    #[test]
    fn test_admin_check() {
        let admin = AdminConfig {
            email: "paulo@vibe.app".to_string(),
            password: "pw".to_string(),
        };
        assert!(admin.check(" paulo@vibe.app ", "pw"));
        assert!(!admin.check("paulo@vibe.app", "PW"));
        assert!(!admin.check("other@vibe.app", "pw"));

        let disabled = AdminConfig::default();
        assert!(!disabled.check("admin@localhost", ""));
    }

    #[test]
    fn test_no_share_base() {
        assert!(ArtistConfig::default().song_share_url("1").is_none());
    }
}
