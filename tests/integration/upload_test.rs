//! Integration tests for uploads.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_whole_file_upload_and_conflict() {
    let app = TestApp::new().await;
    let uri = "/api/resources?source=files&path=/inbox/note.txt";

    let created = app.post_raw(uri, Some("alice"), &[], "hello").await;
    assert_eq!(created.status, StatusCode::OK, "{}", created.text());
    assert_eq!(created.json()["outcome"], "completed");
    assert_eq!(std::fs::read_to_string(app.real("inbox/note.txt")).unwrap(), "hello");

    let conflict = app.post_raw(uri, Some("alice"), &[], "again").await;
    assert_eq!(conflict.status, StatusCode::CONFLICT);

    let replaced = app
        .post_raw(&format!("{uri}&override=true"), Some("alice"), &[], "again")
        .await;
    assert_eq!(replaced.status, StatusCode::OK);
    assert_eq!(std::fs::read_to_string(app.real("inbox/note.txt")).unwrap(), "again");
}

#[tokio::test]
async fn test_chunked_upload() {
    let app = TestApp::new().await;
    let uri = "/api/resources?source=files&path=/inbox/big.bin";

    let first = app
        .post_raw(
            uri,
            Some("alice"),
            &[("X-File-Chunk-Offset", "0"), ("X-File-Total-Size", "10")],
            "hello",
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.json()["outcome"], "chunk_accepted");
    assert!(!app.real("inbox/big.bin").exists());

    let last = app
        .post_raw(
            uri,
            Some("alice"),
            &[("X-File-Chunk-Offset", "5"), ("X-File-Total-Size", "10")],
            "world",
        )
        .await;
    assert_eq!(last.json()["outcome"], "completed");
    assert_eq!(std::fs::read_to_string(app.real("inbox/big.bin")).unwrap(), "helloworld");
}

#[tokio::test]
async fn test_malformed_chunk_headers() {
    let app = TestApp::new().await;
    let response = app
        .post_raw(
            "/api/resources?source=files&path=/inbox/x.bin",
            Some("alice"),
            &[("X-File-Chunk-Offset", "zero"), ("X-File-Total-Size", "10")],
            "x",
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_directory_creation() {
    let app = TestApp::new().await;
    let uri = "/api/resources?source=files&path=/inbox/new&isDir=true";

    let created = app.post_raw(uri, Some("alice"), &[], "").await;
    assert_eq!(created.json()["outcome"], "directory_created");
    assert!(app.real("inbox/new").is_dir());

    let again = app.post_raw(uri, Some("alice"), &[], "").await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_permissions() {
    let app = TestApp::new().await;

    let no_create = app
        .post_raw("/api/resources?source=files&path=/inbox/b.txt", Some("bob"), &[], "x")
        .await;
    assert_eq!(no_create.status, StatusCode::FORBIDDEN);

    let denied_path = app
        .post_raw(
            "/api/resources?source=files&path=/docs/sub/locked.txt&override=true",
            Some("alice"),
            &[],
            "x",
        )
        .await;
    assert_eq!(denied_path.status, StatusCode::FORBIDDEN);
    assert_eq!(
        std::fs::read_to_string(app.real("docs/sub/locked.txt")).unwrap(),
        "secret"
    );
}

#[tokio::test]
async fn test_upload_share_accepts_files() {
    let app = TestApp::new().await;
    let view = app
        .json(
            "POST",
            "/api/shares",
            "alice",
            json!({ "source": "files", "path": "/inbox", "share_type": "upload" }),
        )
        .await
        .json();
    assert_eq!(view["allow_create"], true);
    let hash = view["hash"].as_str().unwrap();

    let response = app
        .post_raw(
            &format!("/public/api/resources?hash={hash}&path=/drop.txt"),
            None,
            &[],
            "dropped",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert_eq!(std::fs::read_to_string(app.real("inbox/drop.txt")).unwrap(), "dropped");

    let read_only = app
        .json("POST", "/api/shares", "alice", json!({ "source": "files", "path": "/docs" }))
        .await
        .json();
    let hash = read_only["hash"].as_str().unwrap();
    let refused = app
        .post_raw(
            &format!("/public/api/resources?hash={hash}&path=/new.txt"),
            None,
            &[],
            "x",
        )
        .await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
}
