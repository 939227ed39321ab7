//! Share link entity model.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use filegate_core::error::AppError;
use filegate_core::types::UserId;
use filegate_core::types::path;

use super::counters::DownloadCounters;

/// Current persisted link format.
pub const LINK_VERSION: u32 = 1;

/// Kind of share.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareType {
    /// Read-only share of a file or folder.
    #[default]
    Normal,
    /// Drop-box share that lets visitors add files.
    Upload,
}

/// Extra navigation link shown in the share sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarLink {
    pub title: String,
    pub url: String,
}

/// Display and behavior configuration of a share.
///
/// Copied verbatim from a creation request into the [`Link`] and only
/// changed through an explicit update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonShare {
    /// Maximum number of downloads (0 = unlimited).
    pub downloads_limit: u64,
    /// Apply `downloads_limit` per user instead of globally.
    pub per_user_download_limit: bool,
    /// Bandwidth cap in KiB/s (0 = unthrottled).
    pub max_bandwidth: u64,
    /// Whether a password protects the share. Set from the link on output.
    pub has_password: bool,
    /// Short-lived direct-download link.
    pub quick_download: bool,
    pub share_type: ShareType,
    /// Real root of the source the share points into.
    pub source: String,
    /// Scoped logical path, always ending with `/`.
    pub path: String,
    /// When non-empty only these users may open the share.
    pub allowed_usernames: Vec<String>,
    /// Require a logged-in viewer.
    pub disable_anonymous: bool,
    pub keep_after_expiration: bool,

    // Presentation
    pub title: String,
    pub description: String,
    pub banner: String,
    pub favicon: String,
    pub share_theme: String,
    pub theme_color: String,
    pub view_mode: String,
    pub enforce_dark_light_mode: String,
    pub hide_nav_buttons: bool,
    pub disable_sidebar: bool,
    pub disable_share_card: bool,
    pub disable_thumbnails: bool,
    pub sidebar_links: Vec<SidebarLink>,

    // Feature toggles
    pub allow_create: bool,
    pub allow_modify: bool,
    pub allow_delete: bool,
    pub allow_replacements: bool,
    pub disable_download: bool,
    pub disable_file_viewer: bool,
    pub extract_embedded_subtitles: bool,

    /// Filled on output only.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub download_url: String,
    /// Filled on output only.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub share_url: String,
}

impl CommonShare {
    /// Upload shares always allow creating entries.
    pub fn normalize(&mut self) {
        if self.share_type == ShareType::Upload {
            self.allow_create = true;
        }
    }

    /// Whether `other` applies a materially different download limit.
    pub fn limit_policy_differs(&self, other: &CommonShare) -> bool {
        self.downloads_limit != other.downloads_limit
            || self.per_user_download_limit != other.per_user_download_limit
    }
}

/// Unit of a share expiry amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl ExpiryUnit {
    /// Parse a unit name; anything unrecognized means hours.
    pub fn parse(unit: &str) -> Self {
        match unit {
            "seconds" => Self::Seconds,
            "minutes" => Self::Minutes,
            "days" => Self::Days,
            _ => Self::Hours,
        }
    }

    /// Length of `amount` units in seconds, `None` on overflow.
    pub fn seconds(self, amount: i64) -> Option<i64> {
        let factor = match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3_600,
            Self::Days => 86_400,
        };
        amount.checked_mul(factor)
    }
}

/// Body of a share create/update request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateShareBody {
    /// Present when updating an existing link.
    pub hash: Option<String>,
    /// Plain-text password; empty or absent means no password.
    pub password: Option<String>,
    /// Expiry amount as a decimal string; empty or absent means never.
    pub expires: Option<String>,
    /// `seconds`, `minutes`, `hours` or `days`.
    pub unit: Option<String>,
    #[serde(flatten)]
    pub common: CommonShare,
}

impl CreateShareBody {
    /// Absolute expiry in unix seconds relative to `now`, 0 for never.
    pub fn expire_at(&self, now: i64) -> Result<i64, AppError> {
        let amount = match self.expires.as_deref().map(str::trim) {
            None | Some("") => return Ok(0),
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::validation(format!("invalid expiry amount '{raw}'")))?,
        };
        if amount < 0 {
            return Err(AppError::validation("expiry amount must not be negative"));
        }
        let unit = ExpiryUnit::parse(self.unit.as_deref().unwrap_or_default());
        unit.seconds(amount)
            .and_then(|secs| now.checked_add(secs))
            .ok_or_else(|| AppError::validation(format!("expiry amount {amount} is too large")))
    }

    /// The supplied password, if non-empty.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// A persisted share link.
///
/// Identity is `hash`. `token` is non-empty exactly when `password_hash`
/// is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Public, URL-safe identifier.
    pub hash: String,
    /// Owner.
    pub user_id: UserId,
    /// Expiry in unix seconds, 0 = never.
    #[serde(default)]
    pub expire: i64,
    /// Password hash, empty when the link has no password.
    #[serde(default)]
    pub password_hash: String,
    /// Bypass token for password-protected direct downloads.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub common: CommonShare,
    /// Shared by every clone, so an updated copy keeps counting into the
    /// same counters.
    #[serde(default)]
    pub counters: Arc<DownloadCounters>,
}

fn default_version() -> u32 {
    LINK_VERSION
}

impl Link {
    /// Create a link with fresh counters.
    pub fn new(hash: impl Into<String>, user_id: UserId, expire: i64, common: CommonShare) -> Self {
        Self {
            hash: hash.into(),
            user_id,
            expire,
            password_hash: String::new(),
            token: String::new(),
            version: LINK_VERSION,
            common,
            counters: Arc::default(),
        }
    }

    /// Attach a password hash and its bypass token together.
    pub fn with_password(mut self, password_hash: String, token: String) -> Self {
        self.password_hash = password_hash;
        self.token = token;
        self
    }

    pub fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }

    /// Whether the link expired at unix time `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expire != 0 && now >= self.expire
    }

    /// Whether the link has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Whether `username` may start another download.
    pub fn check_limit(&self, username: &str) -> bool {
        self.counters.admits(
            self.common.downloads_limit,
            self.common.per_user_download_limit,
            username,
        )
    }

    /// Count a download by `username`.
    pub fn record_download(&self, username: &str) {
        self.counters.record(username);
    }

    /// Count a download by `username` unless the limit is exhausted.
    pub fn try_record_download(&self, username: &str) -> bool {
        self.counters.try_record(
            self.common.downloads_limit,
            self.common.per_user_download_limit,
            username,
        )
    }

    /// Whether `viewer` passes the allowed-usernames list.
    pub fn admits_viewer(&self, viewer: Option<&str>) -> bool {
        if self.common.allowed_usernames.is_empty() {
            return true;
        }
        viewer.is_some_and(|name| self.common.allowed_usernames.iter().any(|u| u == name))
    }

    /// Base name of the shared path.
    pub fn file_name(&self) -> String {
        path::base_name(&self.common.path)
    }
}
