//! HTTP-level scenarios against the full router over the memory store.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use axum::Router;
use folio_manifest::Manifest;
use folio_repo::{ManifestRepository, DEFAULT_MANIFEST_KEY};
use folio_server::{router, AppState};
use folio_service::TrackService;
use folio_store::{DurableStore, MemoryStore};
use folio_test_utils::{seeded_store, temp_replica};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

const BOUNDARY: &str = "folio-test-boundary";

struct Harness {
    _dir: tempfile::TempDir,
    store: Arc<MemoryStore>,
    repo: Arc<ManifestRepository>,
    app: Router,
}

async fn harness() -> Harness {
    // Start from an empty default manifest so scenario counts are exact.
    let store = seeded_store(DEFAULT_MANIFEST_KEY, &Manifest::default());
    let (dir, replica) = temp_replica();
    let repo = Arc::new(ManifestRepository::new(
        Arc::clone(&store) as Arc<dyn DurableStore>,
        replica,
    ));
    repo.refresh_from_durable().await.unwrap();

    let service = Arc::new(TrackService::new(
        Arc::clone(&repo),
        Arc::clone(&store) as Arc<dyn DurableStore>,
    ));
    let app = router(AppState {
        service,
        repo: Arc::clone(&repo),
        store: Arc::clone(&store) as Arc<dyn DurableStore>,
    });

    Harness {
        _dir: dir,
        store,
        repo,
        app,
    }
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: audio/mpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(fields: &[(&str, &str)], files: &[(&str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/tracks")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, files)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn upload_then_list_wip_returns_the_signed_track() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(upload_request(
            &[
                ("type", "WIP"),
                ("title", "Demo"),
                ("artist", "Test Artist"),
                ("links", r#"{"song":"https://example.com/demo"}"#),
            ],
            &[("demo.mp3", b"riff-data")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["message"], "track uploaded");
    assert_eq!(created["track"]["title"], "Demo");

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/tracks/WIP")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tracks = json_body(response).await;
    let tracks = tracks.as_array().unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0]["title"], "Demo");
    assert_eq!(tracks[0]["artist"], "Test Artist");
    let src = tracks[0]["src"].as_str().unwrap();
    assert!(src.starts_with("memory://tracks/wip/"), "signed src: {src}");
}

#[tokio::test]
async fn reel_pair_uploads_list_with_before_and_after_urls() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(upload_request(
            &[("type", "REEL"), ("title", "Mix"), ("artist", "Client")],
            &[("rough.wav", b"a"), ("final.wav", b"b")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/tracks/REEL")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let tracks = json_body(response).await;
    let track = &tracks.as_array().unwrap()[0];

    assert!(track["before"].as_str().unwrap().starts_with("memory://"));
    assert!(track["after"].as_str().unwrap().contains("_version2_"));
    assert!(track.get("src").is_none());
}

#[tokio::test]
async fn wrong_file_count_is_a_bad_request() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(upload_request(
            &[("type", "REEL"), ("title", "Mix"), ("artist", "Client")],
            &[("only-one.wav", b"a")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("2 file(s)"));
}

#[tokio::test]
async fn unknown_type_is_a_bad_request() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/tracks/bootlegs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_only_title_keeps_media_untouched() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(upload_request(
            &[("type", "WIP"), ("title", "Demo"), ("artist", "Me")],
            &[("demo.mp3", b"riff")],
        ))
        .await
        .unwrap();
    let created = json_body(response).await;
    let id = created["track"]["id"].as_str().unwrap().to_string();
    let original_src = created["track"]["src"].as_str().unwrap().to_string();

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/tracks/{id}"))
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"Demo (final)"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cached = h.repo.cached();
    let (_, track) = cached.find_track(&id).unwrap();
    assert_eq!(track.title, "Demo (final)");
    assert_eq!(track.artist, "Me");
    assert_eq!(
        track.media.object_keys(),
        vec![original_src.as_str()],
        "stored object key must be byte-identical after the update"
    );
}

#[tokio::test]
async fn deleting_twice_maps_to_not_found() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(upload_request(
            &[("type", "WIP"), ("title", "Demo"), ("artist", "Me")],
            &[("demo.mp3", b"riff")],
        ))
        .await
        .unwrap();
    let created = json_body(response).await;
    let id = created["track"]["id"].as_str().unwrap().to_string();

    let delete = |app: Router, id: String| async move {
        app.oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/tracks/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    };

    let first = delete(h.app.clone(), id.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = delete(h.app.clone(), id).await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_all_groups_buckets_under_type() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/tracks").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listings = json_body(response).await;
    let types: Vec<&str> = listings
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["WIP", "REEL", "SCORING"]);
}

#[tokio::test]
async fn reconcile_reports_whether_the_replica_changed() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/reconcile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // Default manifest vs. absent-replica default snapshot: identical.
    let body = json_body(response).await;
    assert_eq!(body["changed"], false);
}

#[tokio::test]
async fn healthz_degrades_when_the_store_is_down() {
    let h = harness().await;

    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    h.store.set_unavailable(true);
    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
