//! Path access rule configuration.

use serde::{Deserialize, Serialize};

/// Access rules loaded at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Whether a rule grants or withholds access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleEffect {
    Allow,
    Deny,
}

/// One allow/deny rule as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Source name the rule belongs to.
    pub source: String,
    /// Path prefix inside the source.
    pub path: String,
    /// `*`, `group:<name>` or a username.
    pub subject: String,
    /// Allow or deny.
    pub effect: RuleEffect,
}
