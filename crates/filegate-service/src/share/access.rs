//! Public share resolution.

use std::sync::Arc;

use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::debug;

use filegate_auth::PasswordHasher;
use filegate_core::error::AppError;
use filegate_core::result::AppResult;
use filegate_core::traits::Repository;
use filegate_entity::share::Link;
use filegate_entity::user::User;

use crate::context::ShareActor;

/// Credentials a visitor may present with a share request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareCredentials {
    /// Bypass token issued with password-protected links.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Turns a share hash plus credentials into a [`ShareActor`].
#[derive(Clone)]
pub struct ShareAccessService {
    shares: Arc<dyn Repository<Link, str>>,
    hasher: PasswordHasher,
}

impl std::fmt::Debug for ShareAccessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareAccessService")
            .field("hasher", &self.hasher)
            .finish()
    }
}

impl ShareAccessService {
    pub fn new(shares: Arc<dyn Repository<Link, str>>, hasher: PasswordHasher) -> Self {
        Self { shares, hasher }
    }

    /// Resolve an active share.
    ///
    /// Unknown and expired links are both `NotFound`. A password-protected
    /// link needs its token or the password. Viewer restrictions are
    /// checked last.
    pub async fn resolve(
        &self,
        hash: &str,
        credentials: &ShareCredentials,
        viewer: Option<Arc<User>>,
    ) -> AppResult<ShareActor> {
        if hash.is_empty() {
            return Err(AppError::not_found("Share hash not found"));
        }
        let link = self
            .shares
            .load(hash)
            .await?
            .ok_or_else(|| AppError::not_found("Share hash not found"))?;
        if link.is_expired() {
            debug!(hash, "Rejected expired share");
            return Err(AppError::not_found("Share has expired"));
        }

        if link.has_password() && !self.credentials_match(&link, credentials).await? {
            return Err(AppError::unauthorized("Share password is required"));
        }

        let viewer_name = viewer.as_deref().map(|u| u.username.as_str());
        if link.common.disable_anonymous && viewer.is_none() {
            return Err(AppError::unauthorized("Share requires a logged-in user"));
        }
        if !link.admits_viewer(viewer_name) {
            return Err(AppError::forbidden("User is not allowed to view this share"));
        }

        Ok(ShareActor { link, viewer })
    }

    async fn credentials_match(&self, link: &Link, credentials: &ShareCredentials) -> AppResult<bool> {
        let token_matches = credentials.token.as_deref().is_some_and(|t| {
            !t.is_empty() && bool::from(t.as_bytes().ct_eq(link.token.as_bytes()))
        });
        if token_matches {
            return Ok(true);
        }
        let Some(password) = credentials.password.clone().filter(|p| !p.is_empty()) else {
            return Ok(false);
        };
        let hasher = self.hasher;
        let hash = link.password_hash.clone();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
    }
}
