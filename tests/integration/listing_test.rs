//! Integration tests for directory listings.

use axum::http::StatusCode;
use serde_json::Value;

use crate::helpers::TestApp;

fn names(listing: &Value, key: &str) -> Vec<String> {
    listing[key]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_listing_hides_denied_entries() {
    let app = TestApp::new().await;
    let response = app
        .get("/api/resources?source=files&path=/docs/sub", Some("alice"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["type"], "directory");
    assert_eq!(names(&body, "files"), vec!["b.txt"]);
}

#[tokio::test]
async fn test_listing_root_shows_folders() {
    let app = TestApp::new().await;
    let response = app.get("/api/resources?source=files", Some("bob")).await;

    assert_eq!(response.status, StatusCode::OK);
    let folders = names(&response.json(), "folders");
    assert!(folders.contains(&"docs".to_string()));
    assert!(folders.contains(&"inbox".to_string()));
}

#[tokio::test]
async fn test_denied_file_is_forbidden() {
    let app = TestApp::new().await;
    let response = app
        .get("/api/resources?source=files&path=/docs/sub/locked.txt", Some("alice"))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json()["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let app = TestApp::new().await;

    let anonymous = app.get("/api/resources?source=files", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let stranger = app.get("/api/resources?source=files", Some("mallory")).await;
    assert_eq!(stranger.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_path_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .get("/api/resources?source=files&path=/nope", Some("alice"))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["sources"][0], "files");
}
