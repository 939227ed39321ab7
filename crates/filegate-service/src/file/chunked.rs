//! Chunked upload assembly.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::AsyncRead;
use tracing::{debug, warn};

use filegate_core::error::AppError;
use filegate_core::result::AppResult;
use filegate_core::traits::{IndexProvider, PreviewCache};
use filegate_storage::ChunkWriter;

/// Position of one chunk in the final file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub offset: u64,
    pub total_size: u64,
}

impl ChunkRange {
    /// Parse the chunk offset and total-size header values.
    ///
    /// `None` when neither is present. Either one alone, or a non-numeric
    /// value, is a validation error.
    pub fn from_headers(offset: Option<&str>, total_size: Option<&str>) -> AppResult<Option<Self>> {
        let (offset, total_size) = match (offset, total_size) {
            (None, None) => return Ok(None),
            (Some(offset), Some(total)) => (offset, total),
            _ => {
                return Err(AppError::validation(
                    "Chunk offset and total size must be sent together",
                ));
            }
        };
        let parse = |name: &str, raw: &str| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| AppError::validation(format!("Invalid {name} header: '{raw}'")))
        };
        Ok(Some(Self {
            offset: parse("chunk offset", offset)?,
            total_size: parse("total size", total_size)?,
        }))
    }
}

/// Where an upload lands.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub index: Arc<dyn IndexProvider>,
    pub logical: String,
    pub real_path: PathBuf,
}

/// Assembles uploads in a temp file and moves them into place when done.
#[derive(Debug, Clone)]
pub struct ChunkedUploadAssembler {
    writer: ChunkWriter,
    previews: Arc<dyn PreviewCache>,
}

impl ChunkedUploadAssembler {
    pub fn new(writer: ChunkWriter, previews: Arc<dyn PreviewCache>) -> Self {
        Self { writer, previews }
    }

    /// Write one chunk. Returns `true` once the file is complete and has
    /// been renamed onto its destination.
    pub async fn write_chunk<R>(
        &self,
        target: &UploadTarget,
        range: ChunkRange,
        override_existing: bool,
        body: &mut R,
    ) -> AppResult<bool>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        if range.offset == 0 {
            self.prepare(target, override_existing).await?;
        }
        let written = self.writer.write_at(&target.real_path, range.offset, body).await?;
        let complete = range.offset.saturating_add(written) >= range.total_size;
        debug!(
            path = %target.logical,
            offset = range.offset,
            written,
            total = range.total_size,
            complete,
            "Chunk written"
        );
        if complete {
            self.writer.promote(&target.real_path, range.total_size).await?;
            spawn_refresh(target);
        }
        Ok(complete)
    }

    /// Write a complete body in one call.
    pub async fn write_whole<R>(
        &self,
        target: &UploadTarget,
        override_existing: bool,
        body: &mut R,
    ) -> AppResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.prepare(target, override_existing).await?;
        self.writer.discard(&target.real_path).await?;
        let result = async {
            let written = self.writer.write_at(&target.real_path, 0, body).await?;
            self.writer.promote(&target.real_path, written).await?;
            Ok::<_, AppError>(written)
        }
        .await;
        match result {
            Ok(written) => {
                spawn_refresh(target);
                Ok(written)
            }
            Err(e) => {
                if let Err(cleanup) = self.writer.discard(&target.real_path).await {
                    warn!(path = %target.logical, error = %cleanup, "Failed to remove upload temp file");
                }
                Err(e)
            }
        }
    }

    /// Conflict checks for a fresh upload, and preview invalidation when an
    /// existing file is replaced.
    async fn prepare(&self, target: &UploadTarget, override_existing: bool) -> AppResult<()> {
        match tokio::fs::metadata(&target.real_path).await {
            Ok(meta) if meta.is_dir() => Err(AppError::conflict(format!(
                "A directory already exists at {}",
                target.logical
            ))),
            Ok(_) if !override_existing => Err(AppError::conflict(format!(
                "A file already exists at {}",
                target.logical
            ))),
            Ok(_) => self.previews.invalidate(&target.real_path).await,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Re-index the destination in the background. Failures are only logged.
pub(crate) fn spawn_refresh(target: &UploadTarget) {
    let index = Arc::clone(&target.index);
    let logical = target.logical.clone();
    tokio::spawn(async move {
        if let Err(e) = index.refresh(&logical).await {
            warn!(path = %logical, error = %e, "Index refresh after upload failed");
        }
    });
}
