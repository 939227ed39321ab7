//! Shared test helpers for integration tests.

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use filegate_api::AppState;
use filegate_core::config::AppConfig;

/// Proxy header the test config trusts.
pub const USER_HEADER: &str = "X-Filegate-User";

/// Test application over a throwaway directory tree.
///
/// Source `files` holds `docs/{a.txt, sub/{b.txt, locked.txt}}` and an
/// empty `inbox/`; `docs/sub/locked.txt` is denied to everyone.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    pub state: AppState,
    dir: TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let files = dir.path().join("files");
        std::fs::create_dir_all(files.join("docs/sub")).expect("Failed to create tree");
        std::fs::create_dir_all(files.join("inbox")).expect("Failed to create tree");
        std::fs::write(files.join("docs/a.txt"), "alpha").expect("Failed to write file");
        std::fs::write(files.join("docs/sub/b.txt"), "bravo").expect("Failed to write file");
        std::fs::write(files.join("docs/sub/locked.txt"), "secret").expect("Failed to write file");

        let config = AppConfig::from_toml(&test_config(dir.path(), &files))
            .expect("Failed to load test config");
        let state = filegate_api::build_state(config, CancellationToken::new())
            .await
            .expect("Failed to build state");
        let router = filegate_api::build_app(state.clone());

        Self { router, state, dir }
    }

    /// Real path of an entry in the `files` source.
    pub fn real(&self, relative: &str) -> PathBuf {
        self.dir.path().join("files").join(relative)
    }

    /// Files left in the archive cache directory.
    pub fn cached_archives(&self) -> usize {
        std::fs::read_dir(self.dir.path().join("cache/archives"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// GET `uri`, optionally as `user`.
    pub async fn get(&self, uri: &str, user: Option<&str>) -> TestResponse {
        self.send(Self::builder("GET", uri, user).body(Body::empty()).unwrap())
            .await
    }

    /// Send a JSON body as `user`.
    pub async fn json(&self, method: &str, uri: &str, user: &str, body: Value) -> TestResponse {
        let req = Self::builder(method, uri, Some(user))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    /// POST a raw body with extra headers.
    pub async fn post_raw(
        &self,
        uri: &str,
        user: Option<&str>,
        headers: &[(&str, &str)],
        body: impl Into<Body>,
    ) -> TestResponse {
        let mut builder = Self::builder("POST", uri, user);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder.body(body.into()).unwrap()).await
    }

    /// Send a prepared request.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub fn builder(method: &str, uri: &str, user: Option<&str>) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_HEADER, user);
        }
        builder
    }
}

fn test_config(root: &Path, files: &Path) -> String {
    format!(
        r#"
        [server]
        cache_dir = '{cache}'

        [[sources]]
        name = "files"
        path = '{files}'

        [share]
        bcrypt_cost = 4

        [[auth.users]]
        username = "alice"
        scopes = [{{ source = "files", scope = "/" }}]
        permissions = {{ download = true, share = true, create = true, modify = true }}

        [[auth.users]]
        username = "bob"
        scopes = [{{ source = "files", scope = "/" }}]
        permissions = {{ download = true }}

        [[auth.users]]
        username = "carol"
        scopes = [{{ source = "files", scope = "/" }}]

        [[access.rules]]
        source = "files"
        path = "/"
        subject = "*"
        effect = "allow"

        [[access.rules]]
        source = "files"
        path = "/docs/sub/locked.txt"
        subject = "*"
        effect = "deny"
        "#,
        cache = root.join("cache").display(),
        files = files.display(),
    )
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parsed JSON body
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}
