//! Local filesystem index.
//!
//! Stats the disk directly instead of keeping a cache, so reduced and fresh
//! metadata are always identical. Directory sizes are summed recursively.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use filegate_core::error::{AppError, ErrorKind};
use filegate_core::result::AppResult;
use filegate_core::traits::{IndexProvider, ReducedMetadata, ResolvedPath};
use filegate_core::types::path;
use filegate_core::types::{DirectoryListing, ItemInfo, MediaKind};

/// Index over one local directory tree.
#[derive(Debug, Clone)]
pub struct LocalIndex {
    root: PathBuf,
}

impl LocalIndex {
    /// Create an index rooted at `root`, which must be an existing directory.
    pub fn open(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref();
        let canonical = std::fs::canonicalize(root).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Source root '{}' is not accessible", root.display()),
                e,
            )
        })?;
        if !canonical.is_dir() {
            return Err(AppError::configuration(format!(
                "Source root '{}' is not a directory",
                canonical.display()
            )));
        }
        Ok(Self { root: canonical })
    }

    /// Map a logical path under the root. `..` never escapes it.
    fn real(&self, logical: &str) -> PathBuf {
        let cleaned = path::clean(logical);
        let relative = cleaned.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    async fn stat(&self, logical: &str) -> AppResult<ReducedMetadata> {
        let real = self.real(logical);
        let meta = tokio::fs::metadata(&real).await.map_err(|e| not_found(logical, e))?;
        let size = if meta.is_dir() {
            dir_size(real).await?
        } else {
            meta.len()
        };
        Ok(ReducedMetadata {
            size,
            is_dir: meta.is_dir(),
            modified: meta.modified().ok().map(to_utc),
        })
    }
}

#[async_trait]
impl IndexProvider for LocalIndex {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn resolve_real_path(&self, logical: &str) -> AppResult<ResolvedPath> {
        let real_path = self.real(logical);
        let meta = tokio::fs::metadata(&real_path)
            .await
            .map_err(|e| not_found(logical, e))?;
        Ok(ResolvedPath {
            real_path,
            is_dir: meta.is_dir(),
        })
    }

    async fn reduced_metadata(&self, logical: &str, _is_dir: bool) -> Option<ReducedMetadata> {
        self.stat(logical).await.ok()
    }

    async fn fresh_metadata(&self, logical: &str) -> AppResult<ReducedMetadata> {
        self.stat(logical).await
    }

    fn index_path(&self, raw: &str) -> String {
        let root = self.root.to_string_lossy();
        let stripped = raw.strip_prefix(root.as_ref()).unwrap_or(raw);
        if stripped.ends_with('/') {
            path::as_dir(stripped)
        } else {
            path::clean(stripped)
        }
    }

    async fn directory_listing(&self, logical: &str) -> AppResult<DirectoryListing> {
        let real = self.real(logical);
        let mut entries = tokio::fs::read_dir(&real)
            .await
            .map_err(|e| not_found(logical, e))?;

        let mut folders = Vec::new();
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                // Entry vanished between read_dir and stat.
                Err(_) => continue,
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let modified = meta.modified().ok().map(to_utc);
            if meta.is_dir() {
                let mut item = ItemInfo::new(name, 0, modified);
                item.kind = MediaKind::Other;
                folders.push(item);
            } else {
                files.push(ItemInfo::new(name, meta.len(), modified));
            }
        }
        folders.sort_by(|a, b| a.name.cmp(&b.name));
        files.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(DirectoryListing {
            path: path::as_dir(logical),
            folders,
            files,
        })
    }

    async fn refresh(&self, logical: &str) -> AppResult<()> {
        let meta = self.stat(logical).await?;
        debug!(path = logical, size = meta.size, "Refreshed index entry");
        Ok(())
    }
}

fn not_found(logical: &str, err: std::io::Error) -> AppError {
    if err.kind() == std::io::ErrorKind::NotFound {
        AppError::with_source(ErrorKind::NotFound, format!("Path not found: {logical}"), err)
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to stat {logical}"), err)
    }
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

async fn dir_size(root: PathBuf) -> AppResult<u64> {
    tokio::task::spawn_blocking(move || {
        walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter_map(|entry| entry.metadata().ok())
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
            .sum()
    })
    .await
    .map_err(|e| AppError::internal(format!("Size walk failed: {e}")))
}
