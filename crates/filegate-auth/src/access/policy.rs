//! Rule evaluation over atomically published snapshots.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use filegate_core::error::AppError;
use filegate_core::types::path;
use filegate_entity::access::{Effect, Rule, Subject};
use filegate_entity::user::User;

/// Identity a rule is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct Principal<'a> {
    pub username: &'a str,
    pub groups: &'a [String],
}

impl<'a> Principal<'a> {
    /// A principal with no group memberships.
    pub fn named(username: &'a str) -> Self {
        Self {
            username,
            groups: &[],
        }
    }
}

impl<'a> From<&'a User> for Principal<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            username: &user.username,
            groups: &user.groups,
        }
    }
}

/// Immutable set of rules for every source, keyed by source root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    sources: HashMap<String, Vec<Rule>>,
}

impl RuleSet {
    /// Start an empty builder.
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// Rules of one source, in declaration order.
    pub fn rules_for(&self, source_root: &str) -> &[Rule] {
        self.sources
            .get(source_root)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether `principal` may access `logical_path` inside `source_root`.
    pub fn permitted(&self, source_root: &str, logical_path: &str, principal: Principal<'_>) -> bool {
        let dir = path::as_dir(logical_path);
        let mut best: Option<&Rule> = None;

        for rule in self.rules_for(source_root) {
            if !rule.covers(&dir) || !rule.subject.matches(principal.username, principal.groups) {
                continue;
            }
            best = match best {
                None => Some(rule),
                Some(current) if outranks(rule, current) => Some(rule),
                keep => keep,
            };
        }

        let allowed = best.is_some_and(|rule| rule.effect == Effect::Allow);
        tracing::trace!(
            source = source_root,
            path = logical_path,
            user = principal.username,
            allowed,
            "Evaluated path policy"
        );
        allowed
    }

    /// Copy the rules into a builder for editing.
    pub fn to_builder(&self) -> RuleSetBuilder {
        RuleSetBuilder {
            sources: self.sources.clone(),
        }
    }
}

/// Longer prefix wins, then the more specific subject, then deny.
fn outranks(candidate: &Rule, current: &Rule) -> bool {
    let key = |r: &Rule| {
        (
            r.path_prefix.len(),
            r.subject.specificity(),
            r.effect == Effect::Deny,
        )
    };
    key(candidate) > key(current)
}

/// Mutable staging area for a new [`RuleSet`].
#[derive(Debug, Clone, Default)]
pub struct RuleSetBuilder {
    sources: HashMap<String, Vec<Rule>>,
}

impl RuleSetBuilder {
    /// Append a rule to a source.
    pub fn rule(mut self, source_root: &str, rule: Rule) -> Self {
        self.push(source_root, rule);
        self
    }

    /// Append a rule to a source in place.
    pub fn push(&mut self, source_root: &str, rule: Rule) {
        self.sources
            .entry(source_root.to_string())
            .or_default()
            .push(rule);
    }

    /// Remove every rule of a source matching prefix and subject.
    pub fn remove(&mut self, source_root: &str, prefix: &str, subject: &Subject) -> usize {
        let prefix = path::as_dir(prefix);
        let Some(rules) = self.sources.get_mut(source_root) else {
            return 0;
        };
        let before = rules.len();
        rules.retain(|r| !(r.path_prefix == prefix && &r.subject == subject));
        before - rules.len()
    }

    /// Freeze the builder.
    pub fn build(self) -> RuleSet {
        RuleSet {
            sources: self.sources,
        }
    }
}

/// Path policy holding the live rule snapshot.
///
/// Readers take a cheap `Arc` clone of the current snapshot and evaluate
/// against it; edits build a fresh snapshot and swap the pointer. A
/// reader never sees a half-edited rule set.
#[derive(Debug, Default)]
pub struct PathPolicy {
    current: RwLock<Arc<RuleSet>>,
}

impl PathPolicy {
    /// Create a policy publishing `rules`.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(rules)),
        }
    }

    /// Build a policy from configured rules, mapping source names to roots.
    pub fn from_config<'a>(
        rules: impl IntoIterator<Item = &'a filegate_core::config::access::RuleConfig>,
        source_root: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let mut builder = RuleSet::builder();
        for config in rules {
            let root = source_root(&config.source).ok_or_else(|| {
                AppError::configuration(format!("unknown source '{}' in access rule", config.source))
            })?;
            builder.push(&root, Rule::try_from(config)?);
        }
        Ok(Self::new(builder.build()))
    }

    /// The live snapshot.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the live snapshot.
    pub fn publish(&self, rules: RuleSet) {
        let next = Arc::new(rules);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
        tracing::info!("Published new access rule set");
    }

    /// Edit a copy of the live rules and publish the result.
    pub fn amend(&self, edit: impl FnOnce(&mut RuleSetBuilder)) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut builder = guard.to_builder();
        edit(&mut builder);
        *guard = Arc::new(builder.build());
        tracing::info!("Amended access rule set");
    }

    /// Evaluate against the live snapshot.
    pub fn permitted(&self, source_root: &str, logical_path: &str, principal: Principal<'_>) -> bool {
        self.snapshot().permitted(source_root, logical_path, principal)
    }
}
