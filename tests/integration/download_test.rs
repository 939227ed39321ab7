//! Integration tests for raw downloads and archives.

use std::io::{Cursor, Read};

use axum::http::StatusCode;

use crate::helpers::TestApp;

fn zip_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).expect("valid zip");
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_single_file_download() {
    let app = TestApp::new().await;
    let response = app
        .get("/api/raw?files=files::/docs/a.txt", Some("alice"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "alpha");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"a.txt\"; filename*=utf-8''a.txt"
    );
    assert_eq!(response.header("content-length"), "5");
    assert_eq!(response.header("cache-control"), "private");
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert!(response.header("content-type").starts_with("text/plain"));
}

#[tokio::test]
async fn test_inline_download() {
    let app = TestApp::new().await;
    let response = app
        .get("/api/raw?files=files::/docs/a.txt&inline=true", Some("alice"))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("content-disposition").starts_with("inline;"));
}

#[tokio::test]
async fn test_directory_archive_skips_denied_entries() {
    let app = TestApp::new().await;
    let response = app.get("/api/raw?files=files::/docs", Some("alice")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), "application/octet-stream");
    assert!(response.header("content-disposition").contains("docs.zip"));
    assert_eq!(
        zip_names(&response.body),
        vec!["docs/a.txt", "docs/sub/", "docs/sub/b.txt"]
    );
    assert_eq!(app.cached_archives(), 0);
}

#[tokio::test]
async fn test_multi_select_archive() {
    let app = TestApp::new().await;
    let response = app
        .get(
            "/api/raw?files=files::/docs/a.txt||files::/docs/sub/b.txt||files::/docs/sub/locked.txt",
            Some("bob"),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(zip_names(&response.body), vec!["a.txt", "b.txt"]);

    let mut archive = zip::ZipArchive::new(Cursor::new(response.body.to_vec())).unwrap();
    let mut content = String::new();
    archive
        .by_name("b.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "bravo");
}

#[tokio::test]
async fn test_tar_gz_archive() {
    let app = TestApp::new().await;
    let response = app
        .get("/api/raw?files=files::/docs&algo=tar.gz", Some("alice"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("content-disposition").contains("docs.tar.gz"));
    assert_eq!(&response.body[..2], &[0x1f, 0x8b]);
}

#[tokio::test]
async fn test_unknown_algo_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .get("/api/raw?files=files::/docs&algo=rar", Some("alice"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_denied_downloads() {
    let app = TestApp::new().await;

    let locked = app
        .get("/api/raw?files=files::/docs/sub/locked.txt", Some("alice"))
        .await;
    assert_eq!(locked.status, StatusCode::FORBIDDEN);

    let no_permission = app
        .get("/api/raw?files=files::/docs/a.txt", Some("carol"))
        .await;
    assert_eq!(no_permission.status, StatusCode::FORBIDDEN);

    let empty = app.get("/api/raw?files=", Some("alice")).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}
