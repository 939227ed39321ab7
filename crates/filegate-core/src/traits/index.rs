//! Index collaborator.
//!
//! The index maps logical paths of one source onto the real filesystem and
//! serves cached, stat-like metadata. The delivery pipeline only consumes
//! it; the reference implementation lives in `filegate-storage`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::AppResult;
use crate::types::DirectoryListing;

/// Result of resolving a logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Absolute path on disk.
    pub real_path: PathBuf,
    /// Whether the target is a directory.
    pub is_dir: bool,
}

/// Reduced, cache-friendly metadata for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedMetadata {
    /// Size in bytes (recursive for directories).
    pub size: u64,
    pub is_dir: bool,
    pub modified: Option<DateTime<Utc>>,
}

/// Per-source index of logical paths.
#[async_trait]
pub trait IndexProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Real filesystem root of the source.
    fn root(&self) -> &Path;

    /// Map a logical path to its real path.
    async fn resolve_real_path(&self, logical: &str) -> AppResult<ResolvedPath>;

    /// Cached metadata, `None` when the entry is unknown to the index.
    async fn reduced_metadata(&self, logical: &str, is_dir: bool) -> Option<ReducedMetadata>;

    /// Metadata taken directly from the filesystem, bypassing any cache.
    async fn fresh_metadata(&self, logical: &str) -> AppResult<ReducedMetadata>;

    /// Normalize a raw (logical or real) path into index form.
    fn index_path(&self, raw: &str) -> String;

    /// List a directory.
    async fn directory_listing(&self, logical: &str) -> AppResult<DirectoryListing>;

    /// Re-read metadata for a path after it changed on disk.
    async fn refresh(&self, logical: &str) -> AppResult<()>;
}
