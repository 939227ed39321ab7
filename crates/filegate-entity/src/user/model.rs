//! User account model.

use serde::{Deserialize, Serialize};

use filegate_core::config::auth::{PermissionsConfig, UserConfig};
use filegate_core::types::UserId;
use filegate_core::types::path;

/// Capability flags of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub admin: bool,
    pub download: bool,
    pub share: bool,
    pub create: bool,
    pub modify: bool,
    pub delete: bool,
}

impl From<&PermissionsConfig> for Permissions {
    fn from(config: &PermissionsConfig) -> Self {
        Self {
            admin: config.admin,
            download: config.download,
            share: config.share,
            create: config.create,
            modify: config.modify,
            delete: config.delete,
        }
    }
}

/// The subtree of one source a user is confined to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceScope {
    pub source: String,
    pub scope: String,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub scopes: Vec<SourceScope>,
    #[serde(default)]
    pub permissions: Permissions,
}

impl User {
    /// Create a user with no scopes and no permissions.
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id: UserId::from_username(&username),
            username,
            groups: Vec::new(),
            scopes: Vec::new(),
            permissions: Permissions::default(),
        }
    }

    /// The user's scope inside `source`, cleaned, if the user may use it.
    pub fn scope_for(&self, source: &str) -> Option<String> {
        self.scopes
            .iter()
            .find(|s| s.source == source)
            .map(|s| path::clean(&s.scope))
    }

    pub fn is_admin(&self) -> bool {
        self.permissions.admin
    }
}

impl From<&UserConfig> for User {
    fn from(config: &UserConfig) -> Self {
        Self {
            id: UserId::from_username(&config.username),
            username: config.username.clone(),
            groups: config.groups.clone(),
            scopes: config
                .scopes
                .iter()
                .map(|s| SourceScope {
                    source: s.source.clone(),
                    scope: s.scope.clone(),
                })
                .collect(),
            permissions: Permissions::from(&config.permissions),
        }
    }
}
