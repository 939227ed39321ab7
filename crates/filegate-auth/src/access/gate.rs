//! Listing filter built on [`PathPolicy`].

use std::sync::Arc;

use filegate_core::types::path;
use filegate_core::types::{DirectoryListing, ItemInfo};

use super::policy::{PathPolicy, Principal, RuleSet};

/// Applies the path policy to directory listings.
///
/// Each call evaluates against a single rule snapshot, so a listing is
/// filtered consistently even while rules are being republished.
#[derive(Debug, Clone)]
pub struct AccessGate {
    policy: Arc<PathPolicy>,
}

impl AccessGate {
    pub fn new(policy: Arc<PathPolicy>) -> Self {
        Self { policy }
    }

    /// The underlying policy.
    pub fn policy(&self) -> &Arc<PathPolicy> {
        &self.policy
    }

    /// Single-path check against the live rules.
    pub fn permitted(&self, source_root: &str, logical_path: &str, principal: Principal<'_>) -> bool {
        self.policy.permitted(source_root, logical_path, principal)
    }

    /// Keep the items whose `parent_path/name` is permitted, preserving order.
    pub fn filter_items(
        &self,
        items: Vec<ItemInfo>,
        source_root: &str,
        parent_path: &str,
        principal: Principal<'_>,
    ) -> Vec<ItemInfo> {
        let rules = self.policy.snapshot();
        retain_permitted(&rules, items, source_root, parent_path, principal)
    }

    /// Filter both halves of a listing.
    pub fn filter_listing(
        &self,
        listing: DirectoryListing,
        source_root: &str,
        parent_path: &str,
        principal: Principal<'_>,
    ) -> DirectoryListing {
        let rules = self.policy.snapshot();
        filter_with(&rules, listing, source_root, parent_path, principal)
    }

    /// Decide visibility of a listing whose directory is itself denied.
    ///
    /// Returns `None` when no child is permitted; otherwise the listing
    /// reduced to its permitted children. A deny on a directory must not
    /// hide an allow placed on one of its descendants.
    pub fn resolve_child_visibility(
        &self,
        listing: DirectoryListing,
        source_root: &str,
        parent_path: &str,
        principal: Principal<'_>,
    ) -> Option<DirectoryListing> {
        let rules = self.policy.snapshot();
        let any_visible = listing
            .names()
            .any(|name| rules.permitted(source_root, &child_path(parent_path, name), principal));
        if !any_visible {
            return None;
        }
        Some(filter_with(&rules, listing, source_root, parent_path, principal))
    }
}

fn child_path(parent_path: &str, name: &str) -> String {
    path::join_unix(parent_path, name)
}

fn retain_permitted(
    rules: &RuleSet,
    items: Vec<ItemInfo>,
    source_root: &str,
    parent_path: &str,
    principal: Principal<'_>,
) -> Vec<ItemInfo> {
    items
        .into_iter()
        .filter(|item| rules.permitted(source_root, &child_path(parent_path, &item.name), principal))
        .collect()
}

fn filter_with(
    rules: &RuleSet,
    listing: DirectoryListing,
    source_root: &str,
    parent_path: &str,
    principal: Principal<'_>,
) -> DirectoryListing {
    DirectoryListing {
        path: listing.path,
        folders: retain_permitted(rules, listing.folders, source_root, parent_path, principal),
        files: retain_permitted(rules, listing.files, source_root, parent_path, principal),
    }
}
