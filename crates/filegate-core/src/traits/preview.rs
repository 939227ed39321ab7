//! Derived-artifact cache (thumbnails, previews).

use std::path::Path;

use async_trait::async_trait;

use crate::result::AppResult;

/// Cache of artifacts derived from a file's content.
#[async_trait]
pub trait PreviewCache: Send + Sync + std::fmt::Debug + 'static {
    /// Drop every cached artifact derived from `real_path`.
    async fn invalidate(&self, real_path: &Path) -> AppResult<()>;
}
