//! Application state shared across all handlers.

use std::sync::Arc;

use filegate_auth::PathPolicy;
use filegate_core::config::AppConfig;
use filegate_database::{ShareRepository, UserRepository};
use filegate_service::{
    DownloadService, ResourceService, ShareAccessService, ShareService, UploadService,
};
use filegate_storage::SourceManager;

/// Passed to every Axum handler via `State<AppState>`.
///
/// All fields are `Arc`-wrapped or cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    pub sources: Arc<SourceManager>,
    /// Live access rules; edits publish a new snapshot.
    pub policy: Arc<PathPolicy>,

    // ── Repositories ─────────────────────────────────────────
    pub users: Arc<UserRepository>,
    pub share_repo: Arc<ShareRepository>,

    // ── Services ─────────────────────────────────────────────
    pub share_service: Arc<ShareService>,
    pub access_service: Arc<ShareAccessService>,
    pub download_service: Arc<DownloadService>,
    pub upload_service: Arc<UploadService>,
    pub resource_service: Arc<ResourceService>,
}
