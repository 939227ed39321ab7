//! Directory listings and file info under the path policy.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use filegate_auth::AccessGate;
use filegate_core::error::AppError;
use filegate_core::result::AppResult;
use filegate_core::types::path;
use filegate_core::types::{DirectoryListing, ItemInfo};
use filegate_storage::SourceManager;

use crate::context::Actor;
use crate::media::MediaExtractors;

/// A listed directory or a single file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    Directory {
        #[serde(flatten)]
        listing: DirectoryListing,
    },
    File {
        /// Path as seen by the caller.
        path: String,
        #[serde(flatten)]
        item: ItemInfo,
    },
}

#[derive(Debug, Clone)]
pub struct ResourceService {
    sources: Arc<SourceManager>,
    gate: AccessGate,
    extractors: Arc<MediaExtractors>,
}

impl ResourceService {
    pub fn new(sources: Arc<SourceManager>, gate: AccessGate, extractors: Arc<MediaExtractors>) -> Self {
        Self {
            sources,
            gate,
            extractors,
        }
    }

    /// Info about `path`. Returned paths are relative to the caller's scope.
    pub async fn get(
        &self,
        actor: &Actor,
        source_name: &str,
        requested: &str,
        with_metadata: bool,
    ) -> AppResult<Resource> {
        let (source, logical) = actor.scoped_path(&self.sources, source_name, requested)?;
        let display = path::clean(requested);
        let denied = || AppError::forbidden(format!("Access denied to path {display}"));

        // A denied path reads the same whether or not it exists.
        let permitted = actor.permits(&self.gate, &source, &logical);
        let target = match source.index.resolve_real_path(&logical).await {
            Ok(target) => target,
            Err(_) if !permitted => return Err(denied()),
            Err(e) => return Err(e),
        };

        if !target.is_dir {
            if !permitted {
                return Err(denied());
            }
            let meta = match source.index.reduced_metadata(&logical, false).await {
                Some(meta) => meta,
                None => source.index.fresh_metadata(&logical).await?,
            };
            let mut items = vec![ItemInfo::new(path::base_name(&logical), meta.size, meta.modified)];
            if with_metadata {
                if let Some(dir) = target.real_path.parent() {
                    self.extractors.enrich(&mut items, dir).await;
                }
            }
            let item = items.remove(0);
            return Ok(Resource::File { path: display, item });
        }

        let listing = source.index.directory_listing(&logical).await?;
        let mut listing = self
            .visible(actor, &source.root(), &logical, listing)
            .ok_or_else(denied)?;
        if with_metadata {
            self.extractors.enrich(&mut listing.files, &target.real_path).await;
        }
        listing.path = path::as_dir(&display);
        Ok(Resource::Directory { listing })
    }

    /// `None` when the directory is denied and nothing in it is visible.
    fn visible(
        &self,
        actor: &Actor,
        source_root: &str,
        logical: &str,
        listing: DirectoryListing,
    ) -> Option<DirectoryListing> {
        let ctx = match actor {
            Actor::Share(_) => return Some(listing),
            Actor::User(ctx) => ctx,
        };

        let principal = ctx.principal();
        if self.gate.permitted(source_root, logical, principal) {
            return Some(self.gate.filter_listing(listing, source_root, logical, principal));
        }
        debug!(path = logical, user = ctx.username(), "Directory denied, checking children");
        self.gate
            .resolve_child_visibility(listing, source_root, logical, principal)
    }
}
