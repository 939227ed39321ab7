//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod access;
pub mod app;
pub mod auth;
pub mod logging;
pub mod share;
pub mod storage;

use serde::{Deserialize, Serialize};

use self::access::AccessConfig;
use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::logging::LoggingConfig;
use self::share::ShareConfig;
use self::storage::SourceConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Filesystem roots exposed to users.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    /// Share link settings.
    #[serde(default)]
    pub share: ShareConfig,
    /// User directory and proxy authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Path access rules.
    #[serde(default)]
    pub access: AccessConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `FILEGATE_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FILEGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(raw: &str) -> Result<Self, AppError> {
        let loaded: Self = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Look up a configured source by its logical name.
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Reject configurations the pipeline cannot serve.
    pub fn validate(&self) -> Result<(), AppError> {
        for (i, source) in self.sources.iter().enumerate() {
            if source.name.is_empty() {
                return Err(AppError::configuration(format!(
                    "sources[{i}] has an empty name"
                )));
            }
            if self.sources[..i].iter().any(|s| s.name == source.name) {
                return Err(AppError::configuration(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
        }
        for rule in &self.access.rules {
            if self.source(&rule.source).is_none() {
                return Err(AppError::configuration(format!(
                    "access rule references unknown source '{}'",
                    rule.source
                )));
            }
        }
        Ok(())
    }
}
