//! HTTP server configuration.

use serde::{Deserialize, Serialize};

const GIB: u64 = 1024 * 1024 * 1024;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path prefix the service is mounted under; always ends with `/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Public origin used when building share URLs (empty = derive from request).
    #[serde(default)]
    pub external_url: String,
    /// Directory for temporary archives and in-flight uploads.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Maximum combined archive size in GiB (0 = unlimited).
    #[serde(default)]
    pub max_archive_size_gb: u64,
    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl ServerConfig {
    /// Archive size cap in bytes, or `None` when unlimited.
    pub fn max_archive_size_bytes(&self) -> Option<u64> {
        (self.max_archive_size_gb > 0).then(|| self.max_archive_size_gb * GIB)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: default_base_url(),
            external_url: String::new(),
            cache_dir: default_cache_dir(),
            max_archive_size_gb: 0,
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "/".to_string()
}

fn default_cache_dir() -> String {
    "data/cache".to_string()
}

fn default_shutdown_grace() -> u64 {
    10
}
