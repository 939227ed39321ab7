//! Who is acting on a request: a logged-in user or a share link.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use filegate_auth::{AccessGate, Principal};
use filegate_core::error::AppError;
use filegate_core::result::AppResult;
use filegate_core::types::path;
use filegate_entity::share::Link;
use filegate_entity::user::User;
use filegate_storage::{Source, SourceManager};

/// Username recorded for share downloads without a logged-in viewer.
pub const ANONYMOUS: &str = "anonymous";

/// Context for an authenticated user request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated user.
    pub user: Arc<User>,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(user: Arc<User>, ip_address: String, user_agent: Option<String>) -> Self {
        Self {
            user,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    pub fn principal(&self) -> Principal<'_> {
        Principal::from(self.user.as_ref())
    }

    /// Resolve `source_name` and join `path` under the user's scope there.
    ///
    /// An unknown source is `NotFound`; a source the user has no scope in
    /// (and that has no default scope) is `Forbidden`.
    pub fn scoped_path(
        &self,
        sources: &SourceManager,
        source_name: &str,
        logical: &str,
    ) -> AppResult<(Source, String)> {
        let source = sources
            .get(source_name)
            .ok_or_else(|| AppError::not_found(format!("Source not found: {source_name}")))?;
        let scope = self
            .user
            .scope_for(source_name)
            .or_else(|| source.config.default_scope.as_deref().map(path::clean))
            .ok_or_else(|| {
                AppError::forbidden(format!(
                    "Source {source_name} is not available for user {}",
                    self.user.username
                ))
            })?;
        Ok((source.clone(), path::join_unix(&scope, &path::clean(logical))))
    }
}

/// An active share link, optionally viewed by a logged-in user.
#[derive(Debug, Clone)]
pub struct ShareActor {
    pub link: Arc<Link>,
    pub viewer: Option<Arc<User>>,
}

impl ShareActor {
    /// Name used for per-user download accounting.
    pub fn username(&self) -> &str {
        self.viewer
            .as_deref()
            .map(|u| u.username.as_str())
            .unwrap_or(ANONYMOUS)
    }

    /// Fails early when the link forbids downloads or its limit is
    /// exhausted. [`Self::record_download`] has the final say.
    pub fn authorize_download(&self) -> AppResult<()> {
        if self.link.common.disable_download {
            return Err(AppError::forbidden("Downloads are disabled for this share"));
        }
        if !self.link.check_limit(self.username()) {
            return Err(AppError::forbidden("Share download limit reached"));
        }
        Ok(())
    }

    /// Count one started download, failing when the limit is exhausted.
    pub fn record_download(&self) -> AppResult<()> {
        if !self.link.try_record_download(self.username()) {
            return Err(AppError::forbidden("Share download limit reached"));
        }
        tracing::debug!(hash = %self.link.hash, user = self.username(), "Recorded share download");
        Ok(())
    }

    /// The link's source and `logical` joined under the shared path.
    pub fn scoped_path(&self, sources: &SourceManager, logical: &str) -> AppResult<(Source, String)> {
        let source = sources
            .by_root(&self.link.common.source)
            .ok_or_else(|| AppError::not_found("Shared source is no longer available"))?;
        Ok((
            source.clone(),
            path::join_unix(&self.link.common.path, &path::clean(logical)),
        ))
    }
}

/// The party a request acts for.
#[derive(Debug, Clone)]
pub enum Actor {
    User(RequestContext),
    Share(ShareActor),
}

impl Actor {
    /// Map a `source`/`path` pair to a source and a logical path.
    ///
    /// Share actors are pinned to the link's source; the name is ignored.
    pub fn scoped_path(
        &self,
        sources: &SourceManager,
        source_name: &str,
        logical: &str,
    ) -> AppResult<(Source, String)> {
        match self {
            Self::User(ctx) => ctx.scoped_path(sources, source_name, logical),
            Self::Share(share) => share.scoped_path(sources, logical),
        }
    }

    /// Path policy check. Share actors are already granted by their link.
    pub fn permits(&self, gate: &AccessGate, source: &Source, logical: &str) -> bool {
        match self {
            Self::User(ctx) => gate.permitted(&source.root(), logical, ctx.principal()),
            Self::Share(_) => true,
        }
    }

    /// Username for logging.
    pub fn username(&self) -> &str {
        match self {
            Self::User(ctx) => ctx.username(),
            Self::Share(share) => share.username(),
        }
    }

    pub fn as_share(&self) -> Option<&ShareActor> {
        match self {
            Self::Share(share) => Some(share),
            Self::User(_) => None,
        }
    }
}
