//! Share CRUD service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use filegate_auth::{AccessGate, PasswordHasher};
use filegate_core::error::AppError;
use filegate_core::result::AppResult;
use filegate_core::traits::{OwnedRepository, Repository};
use filegate_core::types::path;
use filegate_database::UserRepository;
use filegate_entity::share::{CommonShare, CreateShareBody, ExpiryUnit, Link};
use filegate_storage::{Source, SourceManager};

use super::link::{LinkService, RequestOrigin};
use crate::context::RequestContext;

/// A link as shown to its owner (or an admin). Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct ShareView {
    pub hash: String,
    /// Owner's username, empty when the owner no longer exists.
    pub username: String,
    pub path_exists: bool,
    pub expire: i64,
    pub downloads: u64,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub user_downloads: HashMap<String, u64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token: String,
    pub version: u32,
    /// `source` holds the source name here, not its root.
    #[serde(flatten)]
    pub common: CommonShare,
}

/// Query of a direct-download link request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectDownloadRequest {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub path: String,
    /// Lifetime in minutes.
    pub duration: Option<i64>,
    /// Download limit, 0 = unlimited.
    pub count: Option<u64>,
    /// Bandwidth cap in KiB/s, 0 = unlimited.
    pub speed: Option<u64>,
}

/// Result of a direct-download link request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectDownloadResponse {
    /// `"201"` when an equivalent link was reused, `"200"` for a new link.
    pub status: String,
    pub hash: String,
    pub url: String,
    pub share_url: String,
}

/// Owns the lifecycle of share links.
#[derive(Clone)]
pub struct ShareService {
    shares: Arc<dyn OwnedRepository<Link, str>>,
    users: Arc<UserRepository>,
    sources: Arc<SourceManager>,
    gate: AccessGate,
    links: LinkService,
    hasher: PasswordHasher,
    direct_download_minutes: i64,
}

impl std::fmt::Debug for ShareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareService").finish()
    }
}

impl ShareService {
    pub fn new(
        shares: Arc<dyn OwnedRepository<Link, str>>,
        users: Arc<UserRepository>,
        sources: Arc<SourceManager>,
        gate: AccessGate,
        links: LinkService,
        hasher: PasswordHasher,
        direct_download_minutes: i64,
    ) -> Self {
        Self {
            shares,
            users,
            sources,
            gate,
            links,
            hasher,
            direct_download_minutes,
        }
    }

    /// The URL builder.
    pub fn links(&self) -> &LinkService {
        &self.links
    }

    /// Create a link, or update the one named by `body.hash`.
    pub async fn create_or_update(
        &self,
        ctx: &RequestContext,
        body: CreateShareBody,
        origin: Option<&RequestOrigin>,
    ) -> AppResult<ShareView> {
        require_share_permission(ctx)?;
        match body.hash.clone().filter(|h| !h.is_empty()) {
            Some(hash) => self.update(ctx, &hash, body, origin).await,
            None => self.create(ctx, body, origin).await,
        }
    }

    /// Create a new link on `body.common.source` / `body.common.path`.
    ///
    /// The path may name a not-yet-existing entry as long as its parent
    /// exists, so upload targets can be shared.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        body: CreateShareBody,
        origin: Option<&RequestOrigin>,
    ) -> AppResult<ShareView> {
        let expire = body.expire_at(Utc::now().timestamp())?;
        let credentials = self.password_credentials(body.password()).await?;

        let source_name = body.common.source.clone();
        let source = self.sources.get(&source_name).ok_or_else(|| {
            AppError::forbidden(format!("Source with name not found: {source_name}"))
        })?;
        if source.is_private() {
            return Err(AppError::forbidden(
                "The target source is private, sharing is not permitted",
            ));
        }

        let (source, scope_path) = ctx.scoped_path(&self.sources, &source_name, &body.common.path)?;
        let scope_path = path::as_dir(&scope_path);
        self.require_permitted(ctx, &source, &scope_path)?;

        self.require_shareable_target(&source, &scope_path).await?;

        let mut common = body.common;
        common.path = scope_path;
        common.source = source.root();
        let mut link = Link::new(self.links.generate_hash(), ctx.user.id, expire, common);
        if let Some((password_hash, token)) = credentials {
            link = link.with_password(password_hash, token);
        }
        finalize_common(&mut link);

        let link = Arc::new(link);
        self.shares.save(Arc::clone(&link)).await?;
        info!(
            user = ctx.username(),
            hash = %link.hash,
            path = %link.common.path,
            "Share created"
        );
        self.view(&link, origin).await
    }

    /// Replace the configuration of an existing link.
    ///
    /// Path, source and owner are kept. A change of the download limit or of
    /// the per-user flag zeroes the counters.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        hash: &str,
        body: CreateShareBody,
        origin: Option<&RequestOrigin>,
    ) -> AppResult<ShareView> {
        let existing = self
            .shares
            .load(hash)
            .await?
            .ok_or_else(|| AppError::validation("Invalid hash provided"))?;
        ensure_owner(ctx, &existing)?;

        let expire = body.expire_at(Utc::now().timestamp())?;
        let credentials = self.password_credentials(body.password()).await?;
        let link = Arc::new(apply_update(&existing, body.common, expire, credentials));
        self.shares.save(Arc::clone(&link)).await?;

        info!(user = ctx.username(), hash = %link.hash, "Share updated");
        self.view(&link, origin).await
    }

    /// Delete a link owned by the caller (admins may delete any link).
    pub async fn delete(&self, ctx: &RequestContext, hash: &str) -> AppResult<()> {
        if hash.is_empty() {
            return Err(AppError::validation("Share hash is required"));
        }
        let link = self.load(hash).await?;
        ensure_owner(ctx, &link)?;
        self.shares.delete(hash).await?;
        info!(user = ctx.username(), hash, "Share deleted");
        Ok(())
    }

    /// Every link for admins, the caller's own links otherwise.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        origin: Option<&RequestOrigin>,
    ) -> AppResult<Vec<ShareView>> {
        let links = if ctx.is_admin() {
            self.shares.list_all().await?
        } else {
            self.shares.list_by_user(&ctx.user.id).await?
        };
        self.views(&links, origin).await
    }

    /// The caller's links on one path.
    pub async fn shares_for_path(
        &self,
        ctx: &RequestContext,
        source_name: &str,
        logical: &str,
        origin: Option<&RequestOrigin>,
    ) -> AppResult<Vec<ShareView>> {
        let (source, scope_path) = ctx.scoped_path(&self.sources, source_name, logical)?;
        let links = self.links_on_path(ctx, &source, &scope_path).await?;
        self.views(&links, origin).await
    }

    /// Point a link at a different path.
    pub async fn patch_path(
        &self,
        ctx: &RequestContext,
        hash: &str,
        new_path: &str,
        origin: Option<&RequestOrigin>,
    ) -> AppResult<ShareView> {
        if hash.is_empty() || new_path.is_empty() {
            return Err(AppError::validation("Hash and path are required"));
        }
        let existing = self.load(hash).await?;
        ensure_owner(ctx, &existing)?;

        let source_name = self
            .sources
            .by_root(&existing.common.source)
            .map(|s| s.name().to_string())
            .ok_or_else(|| AppError::not_found("Shared source is no longer available"))?;
        let (source, scope_path) = ctx.scoped_path(&self.sources, &source_name, new_path)?;
        let scope_path = path::as_dir(&scope_path);
        self.require_permitted(ctx, &source, &scope_path)?;
        self.require_shareable_target(&source, &scope_path).await?;

        let mut link = (*existing).clone();
        link.common.path = scope_path;
        let link = Arc::new(link);
        self.shares.save(Arc::clone(&link)).await?;
        info!(user = ctx.username(), hash, path = %link.common.path, "Share path changed");
        self.view(&link, origin).await
    }

    /// Public configuration of a link, with its URLs filled in.
    pub async fn info(&self, hash: &str, origin: Option<&RequestOrigin>) -> AppResult<CommonShare> {
        let link = self.load(hash).await?;
        let mut common = link.common.clone();
        common.has_password = link.has_password();
        common.download_url = self.links.download_url(&link.hash, origin);
        common.share_url = self.links.share_url(&link.hash, origin);
        Ok(common)
    }

    /// Create (or reuse) a quick-download link for one file.
    pub async fn create_direct_download(
        &self,
        ctx: &RequestContext,
        req: DirectDownloadRequest,
        origin: Option<&RequestOrigin>,
    ) -> AppResult<DirectDownloadResponse> {
        require_share_permission(ctx)?;
        if req.path.is_empty() || req.source.is_empty() {
            return Err(AppError::validation("Path and source are required"));
        }
        if self.sources.get(&req.source).is_none() {
            return Err(AppError::validation(format!("Invalid source name: {}", req.source)));
        }
        let (source, scope_path) = ctx.scoped_path(&self.sources, &req.source, &req.path)?;
        self.require_permitted(ctx, &source, &scope_path)?;

        let metadata = source
            .index
            .reduced_metadata(&scope_path, false)
            .await
            .ok_or_else(|| {
                AppError::validation(format!("Path is either not a file or not found: {}", req.path))
            })?;
        if metadata.is_dir {
            return Err(AppError::validation(format!(
                "Path must be a file, not a directory: {}",
                req.path
            )));
        }

        let minutes = req.duration.unwrap_or(self.direct_download_minutes);
        if minutes <= 0 {
            return Err(AppError::validation("Duration must be positive"));
        }
        let expire = ExpiryUnit::Minutes
            .seconds(minutes)
            .and_then(|secs| Utc::now().timestamp().checked_add(secs))
            .ok_or_else(|| AppError::validation("Duration is too large"))?;
        let downloads_limit = req.count.unwrap_or(0);
        let max_bandwidth = req.speed.unwrap_or(0);

        let existing = self.links_on_path(ctx, &source, &scope_path).await?;
        if let Some(link) =
            find_equivalent_quick_share(&existing, downloads_limit, max_bandwidth, expire)
        {
            return Ok(DirectDownloadResponse {
                status: "201".to_string(),
                hash: link.hash.clone(),
                url: self.links.download_url(&link.hash, origin),
                share_url: self.links.share_url(&link.hash, origin),
            });
        }

        let common = CommonShare {
            path: scope_path,
            source: source.root(),
            downloads_limit,
            max_bandwidth,
            quick_download: true,
            ..Default::default()
        };
        let link = Arc::new(Link::new(self.links.generate_hash(), ctx.user.id, expire, common));
        self.shares.save(Arc::clone(&link)).await?;
        info!(user = ctx.username(), hash = %link.hash, "Direct download link created");

        Ok(DirectDownloadResponse {
            status: "200".to_string(),
            hash: link.hash.clone(),
            url: self.links.download_url(&link.hash, origin),
            share_url: self.links.share_url(&link.hash, origin),
        })
    }

    /// Count one download of `hash` by `username`.
    pub async fn record_download(&self, hash: &str, username: &str) -> AppResult<()> {
        self.load(hash).await?.record_download(username);
        Ok(())
    }

    async fn load(&self, hash: &str) -> AppResult<Arc<Link>> {
        self.shares
            .load(hash)
            .await?
            .ok_or_else(|| AppError::not_found("Share hash not found"))
    }

    async fn links_on_path(
        &self,
        ctx: &RequestContext,
        source: &Source,
        scope_path: &str,
    ) -> AppResult<Vec<Arc<Link>>> {
        let root = source.root();
        let target = path::as_dir(scope_path);
        Ok(self
            .shares
            .list_by_user(&ctx.user.id)
            .await?
            .into_iter()
            .filter(|l| l.common.source == root && path::as_dir(&l.common.path) == target)
            .collect())
    }

    /// The entry, or at least its parent directory, must exist.
    async fn require_shareable_target(&self, source: &Source, scope_path: &str) -> AppResult<()> {
        let index = &source.index;
        if index.reduced_metadata(scope_path, true).await.is_none()
            && index
                .reduced_metadata(&path::parent_dir(scope_path), true)
                .await
                .is_none()
        {
            return Err(AppError::not_found(format!("Path not found: {scope_path}")));
        }
        Ok(())
    }

    fn require_permitted(&self, ctx: &RequestContext, source: &Source, logical: &str) -> AppResult<()> {
        if self.gate.permitted(&source.root(), logical, ctx.principal()) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Access denied to path {logical}")))
        }
    }

    /// Hash the password off the async runtime and mint its bypass token.
    async fn password_credentials(&self, password: Option<&str>) -> AppResult<Option<(String, String)>> {
        let Some(password) = password else {
            return Ok(None);
        };
        let hasher = self.hasher;
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))??;
        Ok(Some((hash, self.links.generate_token())))
    }

    async fn views(
        &self,
        links: &[Arc<Link>],
        origin: Option<&RequestOrigin>,
    ) -> AppResult<Vec<ShareView>> {
        let mut views = Vec::with_capacity(links.len());
        for link in links {
            match self.view(link, origin).await {
                Ok(view) => views.push(view),
                Err(e) => warn!(hash = %link.hash, error = %e, "Skipping share with unknown source"),
            }
        }
        Ok(views)
    }

    async fn view(&self, link: &Link, origin: Option<&RequestOrigin>) -> AppResult<ShareView> {
        let source = self
            .sources
            .by_root(&link.common.source)
            .ok_or_else(|| AppError::not_found(format!("Unknown share source {}", link.common.source)))?;
        let path_exists = source.index.resolve_real_path(&link.common.path).await.is_ok();
        let username = self
            .users
            .find_by_id(&link.user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        let counters = link.counters.snapshot();

        let mut common = link.common.clone();
        common.source = source.name().to_string();
        common.has_password = link.has_password();
        common.download_url = self.links.download_url(&link.hash, origin);
        common.share_url = self.links.share_url(&link.hash, origin);

        Ok(ShareView {
            hash: link.hash.clone(),
            username,
            path_exists,
            expire: link.expire,
            downloads: counters.downloads,
            user_downloads: counters.user_downloads,
            token: link.token.clone(),
            version: link.version,
            common,
        })
    }
}

/// First quick-download link in `existing` with the same limit and
/// bandwidth cap that stays valid at least until `min_expire`.
pub fn find_equivalent_quick_share(
    existing: &[Arc<Link>],
    downloads_limit: u64,
    max_bandwidth: u64,
    min_expire: i64,
) -> Option<Arc<Link>> {
    existing
        .iter()
        .find(|l| {
            l.common.quick_download
                && l.common.downloads_limit == downloads_limit
                && l.common.max_bandwidth == max_bandwidth
                && (l.expire == 0 || l.expire >= min_expire)
        })
        .cloned()
}

/// Build the replacement for `existing` from an update request.
fn apply_update(
    existing: &Link,
    mut common: CommonShare,
    expire: i64,
    credentials: Option<(String, String)>,
) -> Link {
    let reset_counts = existing.common.limit_policy_differs(&common);
    let mut link = existing.clone();
    link.expire = expire;
    let (password_hash, token) = credentials.unwrap_or_default();
    link.password_hash = password_hash;
    link.token = token;

    common.path = existing.common.path.clone();
    common.source = existing.common.source.clone();
    link.common = common;
    finalize_common(&mut link);

    if reset_counts {
        link.counters.reset();
    }
    link
}

fn finalize_common(link: &mut Link) {
    link.common.normalize();
    link.common.has_password = link.has_password();
    link.common.download_url.clear();
    link.common.share_url.clear();
}

fn require_share_permission(ctx: &RequestContext) -> AppResult<()> {
    if ctx.user.permissions.share || ctx.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("User is not allowed to create shares"))
    }
}

fn ensure_owner(ctx: &RequestContext, link: &Link) -> AppResult<()> {
    if link.user_id == ctx.user.id || ctx.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("You can only manage your own shares"))
    }
}

#[cfg(test)]
mod tests {
    use filegate_core::error::ErrorKind;
    use filegate_entity::share::ShareType;

    use super::*;
    use crate::testing::Fixture;

    fn body(path: &str) -> CreateShareBody {
        CreateShareBody {
            common: CommonShare {
                source: "files".into(),
                path: path.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_scopes_path_and_stores_root() {
        let fx = Fixture::new();
        let view = fx
            .shares
            .create_or_update(&fx.ctx("alice"), body("docs/a.txt"), None)
            .await
            .unwrap();

        assert_eq!(view.common.path, "/docs/a.txt/");
        assert_eq!(view.common.source, "files");
        assert_eq!(view.username, "alice");
        assert!(view.path_exists);

        let stored = fx.share_repo.load(&view.hash).await.unwrap().unwrap();
        assert_eq!(stored.common.source, fx.root());
        assert!(stored.common.download_url.is_empty());
    }

    #[tokio::test]
    async fn test_create_allows_missing_entry_with_existing_parent() {
        let fx = Fixture::new();
        let ctx = fx.ctx("alice");
        fx.shares.create(&ctx, body("docs/new-folder"), None).await.unwrap();

        let err = fx.shares.create(&ctx, body("nope/deeper"), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_create_rejects_private_and_unknown_sources() {
        let fx = Fixture::new();
        let ctx = fx.ctx("alice");

        let mut private = body("a.txt");
        private.common.source = "vault".into();
        let err = fx.shares.create(&ctx, private, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let mut unknown = body("a.txt");
        unknown.common.source = "ghost".into();
        let err = fx.shares.create(&ctx, unknown, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_password_sets_token_and_upload_allows_create() {
        let fx = Fixture::new();
        let mut req = body("docs");
        req.password = Some("secret".into());
        req.common.share_type = ShareType::Upload;

        let view = fx.shares.create(&fx.ctx("alice"), req, None).await.unwrap();
        assert!(!view.token.is_empty());
        assert!(view.common.has_password);
        assert!(view.common.allow_create);

        let stored = fx.share_repo.load(&view.hash).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_limit_change_resets_counters() {
        let fx = Fixture::new();
        let ctx = fx.ctx("alice");
        let mut req = body("docs/a.txt");
        req.common.downloads_limit = 10;
        let view = fx.shares.create(&ctx, req, None).await.unwrap();

        for _ in 0..5 {
            fx.shares.record_download(&view.hash, "bob").await.unwrap();
        }
        let stored = fx.share_repo.load(&view.hash).await.unwrap().unwrap();
        assert_eq!(stored.counters.downloads(), 5);

        let mut same = body("ignored");
        same.hash = Some(view.hash.clone());
        same.common.downloads_limit = 10;
        same.common.title = "renamed".into();
        let kept = fx.shares.create_or_update(&ctx, same, None).await.unwrap();
        assert_eq!(kept.downloads, 5);
        assert_eq!(kept.common.path, "/docs/a.txt/");

        let mut changed = body("ignored");
        changed.hash = Some(view.hash.clone());
        changed.common.downloads_limit = 3;
        let reset = fx.shares.create_or_update(&ctx, changed, None).await.unwrap();
        assert_eq!(reset.downloads, 0);
        assert!(reset.user_downloads.is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_hash_is_validation() {
        let fx = Fixture::new();
        let mut req = body("docs");
        req.hash = Some("missing".into());
        let err = fx.shares.create_or_update(&fx.ctx("alice"), req, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_direct_download_dedup() {
        let fx = Fixture::new();
        let ctx = fx.ctx("alice");
        let req = |duration| DirectDownloadRequest {
            source: "files".into(),
            path: "docs/a.txt".into(),
            duration: Some(duration),
            count: Some(3),
            speed: Some(64),
        };

        let first = fx.shares.create_direct_download(&ctx, req(60), None).await.unwrap();
        assert_eq!(first.status, "200");
        let second = fx.shares.create_direct_download(&ctx, req(59), None).await.unwrap();
        assert_eq!(second.status, "201");
        assert_eq!(first.hash, second.hash);

        let longer = fx.shares.create_direct_download(&ctx, req(240), None).await.unwrap();
        assert_eq!(longer.status, "200");
        assert_ne!(longer.hash, first.hash);
        assert!(first.url.ends_with(&format!("public/api/raw?hash={}", first.hash)));
    }

    #[tokio::test]
    async fn test_direct_download_rejects_huge_duration() {
        let fx = Fixture::new();
        let req = DirectDownloadRequest {
            source: "files".into(),
            path: "docs/a.txt".into(),
            duration: Some(i64::MAX / 2),
            ..Default::default()
        };
        let err = fx
            .shares
            .create_direct_download(&fx.ctx("alice"), req, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_direct_download_rejects_directories() {
        let fx = Fixture::new();
        let req = DirectDownloadRequest {
            source: "files".into(),
            path: "docs".into(),
            ..Default::default()
        };
        let err = fx
            .shares
            .create_direct_download(&fx.ctx("alice"), req, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_list_and_delete_respect_ownership() {
        let fx = Fixture::new();
        let alice = fx.ctx("alice");
        let bob = fx.ctx("bob");
        let view = fx.shares.create(&alice, body("docs"), None).await.unwrap();
        fx.shares.create(&bob, body("docs/a.txt"), None).await.unwrap();

        assert_eq!(fx.shares.list(&alice, None).await.unwrap().len(), 1);
        assert_eq!(fx.shares.list(&fx.ctx("admin"), None).await.unwrap().len(), 2);

        let err = fx.shares.delete(&bob, &view.hash).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
        fx.shares.delete(&alice, &view.hash).await.unwrap();
        let err = fx.shares.info(&view.hash, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_shares_for_path_and_patch() {
        let fx = Fixture::new();
        let ctx = fx.ctx("alice");
        let view = fx.shares.create(&ctx, body("docs"), None).await.unwrap();

        let found = fx.shares.shares_for_path(&ctx, "files", "/docs", None).await.unwrap();
        assert_eq!(found.len(), 1);

        let patched = fx.shares.patch_path(&ctx, &view.hash, "/docs/sub", None).await.unwrap();
        assert_eq!(patched.common.path, "/docs/sub/");
        assert!(fx.shares.shares_for_path(&ctx, "files", "/docs", None).await.unwrap().is_empty());

        let err = fx.shares.patch_path(&ctx, &view.hash, "", None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_patch_path_is_scoped_and_checked() {
        let fx = Fixture::new();
        let ctx = fx.ctx("alice");
        let view = fx.shares.create(&ctx, body("docs/a.txt"), None).await.unwrap();

        let err = fx
            .shares
            .patch_path(&ctx, &view.hash, "/docs/sub/locked.txt", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err = fx
            .shares
            .patch_path(&ctx, &view.hash, "/nowhere/deeper", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let stored = fx.share_repo.load(&view.hash).await.unwrap().unwrap();
        assert_eq!(stored.common.path, "/docs/a.txt/");
    }

    #[tokio::test]
    async fn test_update_keeps_downloads_recorded_by_earlier_holders() {
        let fx = Fixture::new();
        let ctx = fx.ctx("alice");
        let view = fx.shares.create(&ctx, body("docs/a.txt"), None).await.unwrap();
        let in_flight = fx.share_repo.load(&view.hash).await.unwrap().unwrap();

        let mut retitle = body("ignored");
        retitle.hash = Some(view.hash.clone());
        retitle.common.title = "renamed".into();
        fx.shares.create_or_update(&ctx, retitle, None).await.unwrap();

        in_flight.record_download("bob");
        let stored = fx.share_repo.load(&view.hash).await.unwrap().unwrap();
        assert_eq!(stored.common.title, "renamed");
        assert_eq!(stored.counters.downloads(), 1);
    }

    #[tokio::test]
    async fn test_sharing_requires_permission() {
        let fx = Fixture::new();
        let err = fx
            .shares
            .create_or_update(&fx.ctx("viewer"), body("docs"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }
}
