//! Share hash/token generation and public URL building.

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};

use filegate_core::config::app::ServerConfig;

const HASH_LEN: usize = 22;

/// Scheme and host a request was addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    /// Derive the origin from the `Host` header and any proxy headers.
    ///
    /// A forwarded host without a forwarded scheme is assumed to be https,
    /// unless it is localhost.
    pub fn from_headers(
        host: Option<&str>,
        forwarded_host: Option<&str>,
        forwarded_proto: Option<&str>,
    ) -> Self {
        match forwarded_host.filter(|h| !h.is_empty()) {
            Some(forwarded) => {
                let scheme = match forwarded_proto.filter(|p| !p.is_empty()) {
                    Some(proto) => proto.to_string(),
                    None if forwarded.contains("localhost") => "http".to_string(),
                    None => "https".to_string(),
                };
                Self {
                    scheme,
                    host: forwarded.to_string(),
                }
            }
            None => Self {
                scheme: "http".to_string(),
                host: host.unwrap_or("localhost").to_string(),
            },
        }
    }
}

/// Generates share identifiers and the URLs that point at them.
#[derive(Debug, Clone)]
pub struct LinkService {
    base_url: String,
    external_url: String,
}

impl LinkService {
    pub fn new(server: &ServerConfig) -> Self {
        let mut base_url = server.base_url.clone();
        if !base_url.starts_with('/') {
            base_url.insert(0, '/');
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            external_url: server.external_url.trim_end_matches('/').to_string(),
        }
    }

    /// A fresh, URL-safe share hash of 22 characters (128 random bits).
    pub fn generate_hash(&self) -> String {
        let bytes: [u8; 16] = rand::random();
        let mut hash = URL_SAFE_NO_PAD.encode(bytes);
        hash.truncate(HASH_LEN);
        hash
    }

    /// A fresh bypass token for password-protected links.
    pub fn generate_token(&self) -> String {
        let bytes: [u8; 24] = rand::random();
        URL_SAFE.encode(bytes)
    }

    /// Direct download URL for `hash`.
    pub fn download_url(&self, hash: &str, origin: Option<&RequestOrigin>) -> String {
        format!("{}public/api/raw?hash={hash}", self.prefix(origin))
    }

    /// Share page URL for `hash`.
    pub fn share_url(&self, hash: &str, origin: Option<&RequestOrigin>) -> String {
        let hash = if hash.is_empty() { "unknown" } else { hash };
        format!("{}public/share/{hash}", self.prefix(origin))
    }

    fn prefix(&self, origin: Option<&RequestOrigin>) -> String {
        if !self.external_url.is_empty() {
            return format!("{}{}", self.external_url, self.base_url);
        }
        match origin {
            Some(origin) => format!("{}://{}{}", origin.scheme, origin.host, self.base_url),
            None => self.base_url.clone(),
        }
    }
}
