//! PostgREST table + object storage client (the hosted Supabase layout).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, info};

use super::{CatalogError, MediaStore, Result, SongStore};
use crate::config::BackendConfig;
use crate::song::{Song, SongDraft, SongPatch};

pub struct RestCatalog {
    http: Client,
    base_url: String,
    api_key: String,
    table: String,
    bucket: String,
}

impl RestCatalog {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CatalogError::InvalidConfig("URL cannot be empty".into()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CatalogError::InvalidConfig(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("vibe/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: config.anon_key.clone(),
            table: config.songs_table.clone(),
            bucket: config.media_bucket.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Public URL of an object in the media bucket.
    pub fn public_url(&self, object_path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object_path
        )
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        if self.api_key.is_empty() {
            req
        } else {
            req.header("apikey", &self.api_key)
                .bearer_auth(&self.api_key)
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response> {
        let response = self.authed(req).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                CatalogError::Unreachable(e.to_string())
            } else {
                CatalogError::Request(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(CatalogError::Backend {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// PostgREST and storage errors carry a JSON `message`; fall back to the
/// raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl SongStore for RestCatalog {
    async fn list_songs(&self) -> Result<Vec<Song>> {
        let url = self.table_url();
        debug!(url = %url, "fetching catalog");

        let response = self
            .send(
                self.http
                    .get(&url)
                    .query(&[("select", "*"), ("order", "created_at.desc")]),
            )
            .await?;

        let songs: Vec<Song> = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("Failed to parse songs: {}", e)))?;

        info!(count = songs.len(), "catalog fetched");
        Ok(songs)
    }

    async fn insert_song(&self, draft: &SongDraft) -> Result<Song> {
        let response = self
            .send(
                self.http
                    .post(self.table_url())
                    .header("Prefer", "return=representation")
                    .json(&[draft]),
            )
            .await?;

        let mut rows: Vec<Song> = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("Failed to parse inserted row: {}", e)))?;

        let song = rows
            .pop()
            .ok_or_else(|| CatalogError::Parse("insert returned no rows".into()))?;
        info!(id = %song.id, title = %song.title, "song inserted");
        Ok(song)
    }

    async fn update_song(&self, id: &str, patch: &SongPatch) -> Result<()> {
        let filter = format!("eq.{}", id);
        self.send(
            self.http
                .patch(self.table_url())
                .query(&[("id", filter.as_str())])
                .json(patch),
        )
        .await?;
        info!(id = %id, "song updated");
        Ok(())
    }

    async fn delete_song(&self, id: &str) -> Result<()> {
        let filter = format!("eq.{}", id);
        self.send(
            self.http
                .delete(self.table_url())
                .query(&[("id", filter.as_str())]),
        )
        .await?;
        info!(id = %id, "song deleted");
        Ok(())
    }
}

#[async_trait]
impl MediaStore for RestCatalog {
    async fn upload(
        &self,
        object_path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, object_path
        );
        let size = bytes.len();
        debug!(url = %url, size, "uploading media");

        self.send(
            self.http
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(bytes),
        )
        .await?;

        info!(path = %object_path, size, "media uploaded");
        Ok(self.public_url(object_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> BackendConfig {
        BackendConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(matches!(
            RestCatalog::new(&config("")),
            Err(CatalogError::InvalidConfig(_))
        ));
        assert!(matches!(
            RestCatalog::new(&config("abc.supabase.co")),
            Err(CatalogError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_public_url() {
        let rest = RestCatalog::new(&config("https://abc.supabase.co/")).unwrap();
        assert_eq!(rest.base_url(), "https://abc.supabase.co");
        assert_eq!(
            rest.public_url("covers/cover-1.png"),
            "https://abc.supabase.co/storage/v1/object/public/msc_media/covers/cover-1.png"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"code":"42501","message":"permission denied"}"#),
            "permission denied"
        );
        assert_eq!(error_message(r#"{"error":"Bucket not found"}"#), "Bucket not found");
        assert_eq!(error_message(" gateway timeout \n"), "gateway timeout");
    }
}
