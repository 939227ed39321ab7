//! Offset-addressed writes into a per-destination temp file.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

use filegate_core::error::{AppError, ErrorKind};
use filegate_core::result::AppResult;

/// Writes upload chunks into `<cache>/uploads/<id>`, where the id is derived
/// from the destination path so retried chunks land in the same file.
#[derive(Debug, Clone)]
pub struct ChunkWriter {
    dir: PathBuf,
}

impl ChunkWriter {
    /// Create a writer keeping temp files under `cache_dir/uploads`.
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: cache_dir.as_ref().join("uploads"),
        }
    }

    /// Stable upload identifier for a destination.
    pub fn upload_id(dest: &Path) -> String {
        format!("{:x}", Sha256::digest(dest.to_string_lossy().as_bytes()))
    }

    /// Temp file backing the upload to `dest`.
    pub fn temp_path(&self, dest: &Path) -> PathBuf {
        self.dir.join(Self::upload_id(dest))
    }

    /// Write `body` at `offset` in the temp file. Returns the bytes written.
    ///
    /// The file is never truncated here, so rewriting a range with the same
    /// bytes leaves it unchanged.
    pub async fn write_at<R>(&self, dest: &Path, offset: u64, body: &mut R) -> AppResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create upload directory", e)
        })?;

        let temp = self.temp_path(dest);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&temp)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open upload temp file {}", temp.display()),
                    e,
                )
            })?;

        file.seek(SeekFrom::Start(offset)).await?;
        let written = tokio::io::copy(body, &mut file).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to write upload chunk", e)
        })?;
        file.flush().await?;

        debug!(temp = %temp.display(), offset, written, "Wrote upload chunk");
        Ok(written)
    }

    /// Cut the temp file to `total_size` and rename it onto `dest`.
    pub async fn promote(&self, dest: &Path, total_size: u64) -> AppResult<()> {
        let temp = self.temp_path(dest);
        let file = tokio::fs::OpenOptions::new().write(true).open(&temp).await?;
        file.set_len(total_size).await?;
        file.sync_all().await?;
        drop(file);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&temp, dest).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to move upload into {}", dest.display()),
                e,
            )
        })?;

        debug!(dest = %dest.display(), size = total_size, "Completed chunked upload");
        Ok(())
    }

    /// Remove a pending temp file, ignoring a missing one.
    pub async fn discard(&self, dest: &Path) -> AppResult<()> {
        match tokio::fs::remove_file(self.temp_path(dest)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
