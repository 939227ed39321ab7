//! Application builder: wires configuration into services and the router.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use filegate_auth::{AccessGate, PasswordHasher, PathPolicy};
use filegate_core::config::AppConfig;
use filegate_core::result::AppResult;
use filegate_database::{ShareRepository, UserRepository};
use filegate_service::{
    ArchiveBuilder, ChunkedUploadAssembler, DownloadService, LinkService, MediaExtractors,
    ResourceService, ShareAccessService, ShareService, UploadService,
};
use filegate_storage::{ChunkWriter, LocalPreviewCache, SourceManager};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state).layer(TraceLayer::new_for_http())
}

/// Construct every service from `config`.
///
/// `shutdown` is cancelled when the server stops; in-flight throttled
/// downloads end early on it.
pub async fn build_state(config: AppConfig, shutdown: CancellationToken) -> AppResult<AppState> {
    let config = Arc::new(config);
    let cache_dir = PathBuf::from(&config.server.cache_dir);

    // ── Step 1: Sources and access rules ─────────────────────────
    let sources = Arc::new(SourceManager::from_config(&config.sources)?);
    tracing::info!(sources = ?sources.names(), "Registered sources");

    let policy = Arc::new(PathPolicy::from_config(&config.access.rules, |name| {
        sources.get(name).map(|s| s.root())
    })?);
    let gate = AccessGate::new(Arc::clone(&policy));

    // ── Step 2: Repositories ─────────────────────────────────────
    let users = Arc::new(UserRepository::from_config(&config.auth));
    let share_repo = Arc::new(match &config.share.snapshot_file {
        Some(path) => ShareRepository::open(path).await?,
        None => ShareRepository::new(),
    });
    tracing::info!(shares = share_repo.len(), "Share store ready");

    // ── Step 3: Services ─────────────────────────────────────────
    let hasher = PasswordHasher::from(&config.share);
    let direct_minutes = i64::try_from(config.share.direct_download_minutes).unwrap_or(i64::MAX);
    let share_service = Arc::new(ShareService::new(
        share_repo.clone(),
        Arc::clone(&users),
        Arc::clone(&sources),
        gate.clone(),
        LinkService::new(&config.server),
        hasher,
        direct_minutes,
    ));
    let access_service = Arc::new(ShareAccessService::new(share_repo.clone(), hasher));

    let archives = ArchiveBuilder::new(
        Arc::clone(&sources),
        gate.clone(),
        cache_dir.join("archives"),
        config.server.max_archive_size_bytes(),
    );
    let download_service = Arc::new(DownloadService::new(
        Arc::clone(&sources),
        gate.clone(),
        archives,
        shutdown,
    ));

    let previews = Arc::new(LocalPreviewCache::new(&cache_dir));
    let upload_service = Arc::new(UploadService::new(
        Arc::clone(&sources),
        gate.clone(),
        ChunkedUploadAssembler::new(ChunkWriter::new(&cache_dir), previews),
    ));
    let resource_service = Arc::new(ResourceService::new(
        Arc::clone(&sources),
        gate,
        Arc::new(MediaExtractors::new()),
    ));

    Ok(AppState {
        config,
        sources,
        policy,
        users,
        share_repo,
        share_service,
        access_service,
        download_service,
        upload_service,
        resource_service,
    })
}
