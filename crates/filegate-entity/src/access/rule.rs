//! Allow/deny rule model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use filegate_core::config::access::{RuleConfig, RuleEffect};
use filegate_core::error::AppError;
use filegate_core::types::path;

/// Whether a rule grants or withholds access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    Deny,
}

impl From<RuleEffect> for Effect {
    fn from(effect: RuleEffect) -> Self {
        match effect {
            RuleEffect::Allow => Self::Allow,
            RuleEffect::Deny => Self::Deny,
        }
    }
}

/// Who a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "name")]
pub enum Subject {
    /// Every user (`*`).
    Everyone,
    /// Members of a group (`group:<name>`).
    Group(String),
    /// One user by name.
    User(String),
}

impl Subject {
    /// Tie-break rank among rules with the same prefix: higher wins.
    pub fn specificity(&self) -> u8 {
        match self {
            Self::Everyone => 0,
            Self::Group(_) => 1,
            Self::User(_) => 2,
        }
    }

    /// Whether the subject covers a user with the given name and groups.
    pub fn matches(&self, username: &str, groups: &[String]) -> bool {
        match self {
            Self::Everyone => true,
            Self::Group(group) => groups.iter().any(|g| g == group),
            Self::User(name) => name == username,
        }
    }
}

impl FromStr for Subject {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(AppError::validation("rule subject must not be empty")),
            "*" => Ok(Self::Everyone),
            other => match other.strip_prefix("group:") {
                Some("") => Err(AppError::validation("rule group name must not be empty")),
                Some(group) => Ok(Self::Group(group.to_string())),
                None => Ok(Self::User(other.to_string())),
            },
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everyone => write!(f, "*"),
            Self::Group(group) => write!(f, "group:{group}"),
            Self::User(name) => write!(f, "{name}"),
        }
    }
}

/// One access rule of a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// Normalized prefix: starts and ends with `/`.
    pub path_prefix: String,
    pub subject: Subject,
    pub effect: Effect,
}

impl Rule {
    /// Build a rule, normalizing the prefix.
    pub fn new(prefix: &str, subject: Subject, effect: Effect) -> Self {
        Self {
            path_prefix: path::as_dir(prefix),
            subject,
            effect,
        }
    }

    pub fn allow(prefix: &str, subject: Subject) -> Self {
        Self::new(prefix, subject, Effect::Allow)
    }

    pub fn deny(prefix: &str, subject: Subject) -> Self {
        Self::new(prefix, subject, Effect::Deny)
    }

    /// Whether the rule's prefix covers a normalized directory-form path.
    pub fn covers(&self, dir_path: &str) -> bool {
        dir_path.starts_with(&self.path_prefix)
    }
}

impl TryFrom<&RuleConfig> for Rule {
    type Error = AppError;

    fn try_from(config: &RuleConfig) -> Result<Self, Self::Error> {
        Ok(Self::new(
            &config.path,
            config.subject.parse()?,
            config.effect.into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_normalized() {
        assert_eq!(Rule::deny("/a", Subject::Everyone).path_prefix, "/a/");
        assert_eq!(Rule::deny("a/b/", Subject::Everyone).path_prefix, "/a/b/");
        assert_eq!(Rule::deny("", Subject::Everyone).path_prefix, "/");
    }

    #[test]
    fn test_subject_parse() {
        assert_eq!("*".parse::<Subject>().unwrap(), Subject::Everyone);
        assert_eq!(
            "group:staff".parse::<Subject>().unwrap(),
            Subject::Group("staff".into())
        );
        assert_eq!("bob".parse::<Subject>().unwrap(), Subject::User("bob".into()));
        assert!("group:".parse::<Subject>().is_err());
        assert!("".parse::<Subject>().is_err());
    }

    #[test]
    fn test_covers_does_not_match_sibling_with_shared_prefix() {
        let rule = Rule::allow("/ab", Subject::Everyone);
        assert!(rule.covers("/ab/c/"));
        assert!(!rule.covers("/abc/"));
    }
}
