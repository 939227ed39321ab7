//! User directory and proxy authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication configuration.
///
/// Login and token issuance happen upstream; Filegate trusts the username
/// carried in `proxy_header` and looks it up in `users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header carrying the authenticated username.
    #[serde(default = "default_proxy_header")]
    pub proxy_header: String,
    /// Known users.
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            proxy_header: default_proxy_header(),
            users: Vec::new(),
        }
    }
}

/// A configured user account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Unique login name.
    pub username: String,
    /// Group memberships used by access rules.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Per-source scopes.
    #[serde(default)]
    pub scopes: Vec<ScopeConfig>,
    /// Capability flags.
    #[serde(default)]
    pub permissions: PermissionsConfig,
}

/// The subtree of a source a user is confined to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Source name.
    pub source: String,
    /// Scope path inside the source (`/` = whole source).
    #[serde(default = "default_scope")]
    pub scope: String,
}

/// User capability flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionsConfig {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub download: bool,
    #[serde(default)]
    pub share: bool,
    #[serde(default)]
    pub create: bool,
    #[serde(default)]
    pub modify: bool,
    #[serde(default)]
    pub delete: bool,
}

fn default_proxy_header() -> String {
    "X-Filegate-User".to_string()
}

fn default_scope() -> String {
    "/".to_string()
}
