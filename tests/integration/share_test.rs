//! Integration tests for share management and public share access.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::TestApp;

async fn create_share(app: &TestApp, body: Value) -> Value {
    let response = app.json("POST", "/api/shares", "alice", body).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    response.json()
}

fn hash_of(view: &Value) -> String {
    view["hash"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_and_download_share() {
    let app = TestApp::new().await;
    let view = create_share(&app, json!({ "source": "files", "path": "/docs" })).await;

    assert_eq!(view["path"], "/docs/");
    assert_eq!(view["source"], "files");
    assert_eq!(view["username"], "alice");
    assert_eq!(view["path_exists"], true);
    let hash = hash_of(&view);
    assert!(
        view["download_url"]
            .as_str()
            .unwrap()
            .ends_with(&format!("/public/api/raw?hash={hash}"))
    );

    let file = app
        .get(&format!("/public/api/raw?hash={hash}&files=/a.txt"), None)
        .await;
    assert_eq!(file.status, StatusCode::OK);
    assert_eq!(file.text(), "alpha");

    let listing = app
        .get(&format!("/public/api/resources?hash={hash}&path=/sub"), None)
        .await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.json()["files"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_share_root_download_is_archive() {
    let app = TestApp::new().await;
    let hash = hash_of(&create_share(&app, json!({ "source": "files", "path": "/docs/sub" })).await);

    let response = app.get(&format!("/public/api/raw?hash={hash}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("content-disposition").contains("sub.zip"));
}

#[tokio::test]
async fn test_download_limit() {
    let app = TestApp::new().await;
    let hash = hash_of(
        &create_share(
            &app,
            json!({ "source": "files", "path": "/docs", "downloads_limit": 1 }),
        )
        .await,
    );
    let uri = format!("/public/api/raw?hash={hash}&files=/a.txt");

    assert_eq!(app.get(&uri, None).await.status, StatusCode::OK);
    assert_eq!(app.get(&uri, None).await.status, StatusCode::FORBIDDEN);

    let shares = app.get("/api/shares", Some("alice")).await.json();
    assert_eq!(shares[0]["downloads"], 1);
}

#[tokio::test]
async fn test_password_protected_share() {
    let app = TestApp::new().await;
    let view = create_share(
        &app,
        json!({ "source": "files", "path": "/docs", "password": "hunter2" }),
    )
    .await;
    let hash = hash_of(&view);
    let token = view["token"].as_str().unwrap().to_string();
    assert_eq!(view["has_password"], true);

    let uri = format!("/public/api/raw?hash={hash}&files=/a.txt");
    assert_eq!(app.get(&uri, None).await.status, StatusCode::UNAUTHORIZED);

    let wrong = TestApp::builder("GET", &uri, None)
        .header("X-Share-Password", "wrong")
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(app.send(wrong).await.status, StatusCode::UNAUTHORIZED);

    let right = TestApp::builder("GET", &uri, None)
        .header("X-Share-Password", "hunter2")
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(app.send(right).await.status, StatusCode::OK);

    let with_token = app.get(&format!("{uri}&token={token}"), None).await;
    assert_eq!(with_token.status, StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_disabled_share() {
    let app = TestApp::new().await;
    let hash = hash_of(
        &create_share(
            &app,
            json!({ "source": "files", "path": "/docs", "disable_anonymous": true }),
        )
        .await,
    );
    let uri = format!("/public/api/raw?hash={hash}&files=/a.txt");

    assert_eq!(app.get(&uri, None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.get(&uri, Some("bob")).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_share_info_and_delete() {
    let app = TestApp::new().await;
    let hash = hash_of(
        &create_share(&app, json!({ "source": "files", "path": "/docs", "title": "Docs" })).await,
    );

    let info = app
        .get(&format!("/public/api/share/info?hash={hash}"), None)
        .await;
    assert_eq!(info.status, StatusCode::OK);
    assert_eq!(info.json()["title"], "Docs");
    assert_eq!(info.json()["has_password"], false);

    let bob_list = app
        .get(&format!("/api/shares?hash={hash}"), Some("bob"))
        .await;
    assert_eq!(bob_list.status, StatusCode::OK);
    assert_eq!(bob_list.json().as_array().unwrap().len(), 0);

    let request = TestApp::builder("DELETE", &format!("/api/shares?hash={hash}"), Some("alice"))
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status, StatusCode::OK);
    assert!(app.state.share_repo.is_empty());

    let gone = app
        .get(&format!("/public/api/share/info?hash={hash}"), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_requires_permission() {
    let app = TestApp::new().await;
    let response = app
        .json("POST", "/api/shares", "bob", json!({ "source": "files", "path": "/docs" }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_shares_for_path_and_patch() {
    let app = TestApp::new().await;
    let hash = hash_of(&create_share(&app, json!({ "source": "files", "path": "/docs" })).await);

    let on_path = app
        .get("/api/shares/path?source=files&path=/docs", Some("alice"))
        .await;
    assert_eq!(on_path.json().as_array().unwrap().len(), 1);

    let patched = app
        .json(
            "PATCH",
            "/api/shares",
            "alice",
            json!({ "hash": hash, "path": "/docs/sub" }),
        )
        .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.json()["path"], "/docs/sub/");
}

#[tokio::test]
async fn test_patch_to_denied_path_is_rejected() {
    let app = TestApp::new().await;
    let hash = hash_of(&create_share(&app, json!({ "source": "files", "path": "/docs/a.txt" })).await);

    let patched = app
        .json(
            "PATCH",
            "/api/shares",
            "alice",
            json!({ "hash": hash, "path": "/docs/sub/locked.txt" }),
        )
        .await;
    assert_eq!(patched.status, StatusCode::FORBIDDEN);

    let served = app.get(&format!("/public/api/raw?hash={hash}"), None).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(served.text(), "alpha");
}

#[tokio::test]
async fn test_direct_download_links() {
    let app = TestApp::new().await;

    let first = app
        .get(
            "/api/shares/direct?source=files&path=/docs/a.txt&duration=60",
            Some("alice"),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.json()["status"], "200");

    let reused = app
        .get(
            "/api/shares/direct?source=files&path=/docs/a.txt&duration=30",
            Some("alice"),
        )
        .await;
    assert_eq!(reused.json()["status"], "201");
    assert_eq!(reused.json()["hash"], first.json()["hash"]);

    let hash = first.json()["hash"].as_str().unwrap().to_string();
    let file = app.get(&format!("/public/api/raw?hash={hash}"), None).await;
    assert_eq!(file.status, StatusCode::OK);
    assert_eq!(file.text(), "alpha");

    let directory = app
        .get("/api/shares/direct?source=files&path=/docs", Some("alice"))
        .await;
    assert_eq!(directory.status, StatusCode::BAD_REQUEST);

    let bad_number = app
        .get(
            "/api/shares/direct?source=files&path=/docs/a.txt&count=lots",
            Some("alice"),
        )
        .await;
    assert_eq!(bad_number.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_share() {
    let app = TestApp::new().await;
    let response = app.get("/public/api/raw?hash=missing", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
