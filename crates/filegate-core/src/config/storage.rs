//! Source (filesystem root) configuration.

use serde::{Deserialize, Serialize};

/// A configured filesystem root exposed to users under a logical name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Logical name used in selectors (`name::path`).
    pub name: String,
    /// Real filesystem root.
    pub path: String,
    /// Private sources cannot be shared.
    #[serde(default)]
    pub private: bool,
    /// Scope applied to users that have no explicit scope for this source.
    #[serde(default)]
    pub default_scope: Option<String>,
}
