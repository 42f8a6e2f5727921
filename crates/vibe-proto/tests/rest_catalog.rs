//! REST catalog against a mock PostgREST/storage server.

use serde_json::json;
use vibe_proto::catalog::submit::{submit_song, SongForm, SubmitContext, SubmitOutcome};
use vibe_proto::catalog::{CatalogError, MediaStore, RestCatalog, SongStore};
use vibe_proto::config::BackendConfig;
use vibe_proto::{Song, SongDraft, SongPatch};
use wiremock::matchers::{body_bytes, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog(server: &MockServer) -> RestCatalog {
    RestCatalog::new(&BackendConfig {
        url: server.uri(),
        anon_key: "anon-key".to_string(),
        ..Default::default()
    })
    .unwrap()
}

fn row(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "author": "Paulo Oliveira",
        "audio_url": format!("https://cdn/{id}.mp3"),
        "cover": null,
        "lyrics": null,
        "isrc": null,
        "created_at": "2024-05-01T12:00:00+00:00"
    })
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn test_list_songs_newest_first_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/songs"))
            .and(query_param("select", "*"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([row(2, "B"), row(1, "A")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let songs = catalog(&server).list_songs().await.unwrap();
        let ids: Vec<_> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert_eq!(songs[0].title, "B");
    }

    #[tokio::test]
    async fn test_backend_error_message_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/songs"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Invalid API key"
            })))
            .mount(&server)
            .await;

        match catalog(&server).list_songs().await {
            Err(CatalogError::Backend { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("expected backend error, got {:?}", other.map(|s| s.len())),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/songs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        assert!(matches!(
            catalog(&server).list_songs().await,
            Err(CatalogError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let rest = RestCatalog::new(&BackendConfig {
            url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            rest.list_songs().await,
            Err(CatalogError::Unreachable(_))
        ));
    }
}

mod mutations {
    use super::*;

    #[tokio::test]
    async fn test_insert_returns_created_row() {
        let server = MockServer::start().await;
        let draft = SongDraft {
            title: "Nova".to_string(),
            author: "Paulo Oliveira".to_string(),
            isrc: Some("BRXYZ2400001".to_string()),
            lyrics: None,
            audio_url: "https://cdn/nova.mp3".to_string(),
            cover: "/imagem_do_autor.png".to_string(),
        };
        Mock::given(method("POST"))
            .and(path("/rest/v1/songs"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!([draft])))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(9, "Nova")])))
            .expect(1)
            .mount(&server)
            .await;

        let song = catalog(&server).insert_song(&draft).await.unwrap();
        assert_eq!(song.id, "9");
    }

    #[tokio::test]
    async fn test_update_filters_by_id() {
        let server = MockServer::start().await;
        let patch = SongPatch {
            title: "Edited".to_string(),
            isrc: None,
            lyrics: Some("la".to_string()),
            audio_url: Some("https://cdn/1.mp3".to_string()),
            cover: "https://cdn/1.jpg".to_string(),
        };
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/songs"))
            .and(query_param("id", "eq.1"))
            .and(body_json(&patch))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        catalog(&server).update_song("1", &patch).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_filters_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/songs"))
            .and(query_param("id", "eq.42"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        catalog(&server).delete_song("42").await.unwrap();
    }
}

mod storage {
    use super::*;

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/storage/v1/object/msc_media/covers/cover-5.png"))
            .and(header("content-type", "image/png"))
            .and(body_bytes(b"png-bytes".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Key": "msc_media/covers/cover-5.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = catalog(&server)
            .upload("covers/cover-5.png", b"png-bytes".to_vec(), "image/png")
            .await
            .unwrap();
        assert_eq!(
            url,
            format!(
                "{}/storage/v1/object/public/msc_media/covers/cover-5.png",
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn test_submit_uploads_then_inserts() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("demo.mp3");
        std::fs::write(&audio, b"mp3").unwrap();

        Mock::given(method("POST"))
            .and(path("/storage/v1/object/msc_media/audios/audio-77.mp3"))
            .and(header("content-type", "audio/mpeg"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let expected_audio = format!(
            "{}/storage/v1/object/public/msc_media/audios/audio-77.mp3",
            server.uri()
        );
        Mock::given(method("POST"))
            .and(path("/rest/v1/songs"))
            .and(body_json(json!([{
                "title": "Demo",
                "author": "Paulo Oliveira",
                "isrc": null,
                "lyrics": null,
                "audio_url": expected_audio,
                "cover": "/imagem_do_autor.png"
            }])))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([row(3, "Demo")])))
            .expect(1)
            .mount(&server)
            .await;

        let rest = catalog(&server);
        let form = SongForm {
            title: "Demo".to_string(),
            audio_file: Some(audio),
            ..Default::default()
        };
        let ctx = SubmitContext {
            author: "Paulo Oliveira",
            default_cover: "/imagem_do_autor.png",
            now_millis: 77,
        };
        let outcome = submit_song(&rest, &rest, &form, None, &ctx).await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Created(Song { ref id, .. }) if id == "3"));
    }

    #[tokio::test]
    async fn test_failed_upload_skips_insert() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("demo.mp3");
        std::fs::write(&audio, b"mp3").unwrap();

        Mock::given(method("POST"))
            .and(path("/storage/v1/object/msc_media/audios/audio-1.mp3"))
            .respond_with(ResponseTemplate::new(413).set_body_json(json!({
                "error": "Payload too large"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/songs"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let rest = catalog(&server);
        let form = SongForm {
            title: "Demo".to_string(),
            audio_file: Some(audio),
            ..Default::default()
        };
        let ctx = SubmitContext {
            author: "Paulo Oliveira",
            default_cover: "/imagem_do_autor.png",
            now_millis: 1,
        };
        let err = submit_song(&rest, &rest, &form, None, &ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "Backend error (413): Payload too large");
    }
}
