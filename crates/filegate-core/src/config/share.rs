//! Share link configuration.

use serde::{Deserialize, Serialize};

/// Algorithm used to hash share passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HasherAlgorithm {
    /// bcrypt (default, compatible with existing share stores).
    Bcrypt,
    /// Argon2id.
    Argon2,
}

/// Share link configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Password hashing algorithm for new links.
    #[serde(default = "default_hasher")]
    pub password_hasher: HasherAlgorithm,
    /// bcrypt work factor.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    /// Lifetime of direct-download links when the request gives none.
    #[serde(default = "default_direct_minutes")]
    pub direct_download_minutes: u64,
    /// JSON file the share store is restored from and flushed to.
    #[serde(default)]
    pub snapshot_file: Option<String>,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            password_hasher: default_hasher(),
            bcrypt_cost: default_bcrypt_cost(),
            direct_download_minutes: default_direct_minutes(),
            snapshot_file: None,
        }
    }
}

fn default_hasher() -> HasherAlgorithm {
    HasherAlgorithm::Bcrypt
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_direct_minutes() -> u64 {
    60
}
