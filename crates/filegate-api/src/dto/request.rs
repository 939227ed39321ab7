//! Query and body shapes of API requests.

use serde::Deserialize;

use filegate_core::error::AppError;

/// `?source=&path=&metadata=`
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceQuery {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub metadata: bool,
}

/// `?source=&path=&override=&isDir=`
#[derive(Debug, Clone, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, rename = "override")]
    pub override_existing: bool,
    #[serde(default, rename = "isDir")]
    pub is_dir: bool,
}

/// `?files=src::path||src::path&inline=&algo=&flatten=`
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuery {
    #[serde(default)]
    pub files: String,
    #[serde(default)]
    pub inline: bool,
    pub algo: Option<String>,
    #[serde(default)]
    pub flatten: bool,
}

/// `?hash=`
#[derive(Debug, Clone, Deserialize)]
pub struct HashQuery {
    #[serde(default)]
    pub hash: String,
}

/// Query of the public share endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicQuery {
    #[serde(default)]
    pub hash: String,
    pub token: Option<String>,
    /// Path inside the share.
    #[serde(default)]
    pub path: String,
    /// Selectors inside the share; defaults to the share root.
    #[serde(default)]
    pub files: String,
    #[serde(default)]
    pub inline: bool,
    pub algo: Option<String>,
    #[serde(default)]
    pub flatten: bool,
    #[serde(default)]
    pub metadata: bool,
    #[serde(default, rename = "override")]
    pub override_existing: bool,
    #[serde(default, rename = "isDir")]
    pub is_dir: bool,
}

/// Direct-download link request, numbers still as sent.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectDownloadQuery {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub path: String,
    pub duration: Option<String>,
    pub count: Option<String>,
    pub speed: Option<String>,
}

impl DirectDownloadQuery {
    pub fn into_request(self) -> Result<filegate_service::DirectDownloadRequest, AppError> {
        Ok(filegate_service::DirectDownloadRequest {
            duration: parse_number("duration", self.duration.as_deref())?,
            count: parse_number("count", self.count.as_deref())?,
            speed: parse_number("speed", self.speed.as_deref())?,
            source: self.source,
            path: self.path,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, AppError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::validation(format!("Invalid {name}: '{raw}'"))),
    }
}

/// Body of `PATCH /api/shares`.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchShareRequest {
    pub hash: String,
    pub path: String,
}
