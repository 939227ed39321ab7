//! Media metadata extraction capability.

use std::path::Path;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{MediaKind, MediaMetadata};

/// Extracts tags from files of one media kind.
///
/// Implementations are registered per [`MediaKind`] at construction time.
#[async_trait]
pub trait MetadataExtractor: Send + Sync + std::fmt::Debug + 'static {
    /// The kind of media this extractor understands.
    fn kind(&self) -> MediaKind;

    /// Read tags from the file at `real_path`.
    async fn extract(&self, real_path: &Path) -> AppResult<MediaMetadata>;
}
