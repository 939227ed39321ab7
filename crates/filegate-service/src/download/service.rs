//! Download orchestration.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use pin_project_lite::pin_project;
use tempfile::TempPath;
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;

use filegate_auth::AccessGate;
use filegate_core::error::AppError;
use filegate_core::result::AppResult;
use filegate_core::types::path;
use filegate_storage::{ArchiveFormat, SourceManager, ThrottledReader};

use super::archive::ArchiveBuilder;
use super::selector::FileSelector;
use crate::context::Actor;

/// Body of a download response.
pub type DownloadReader = Pin<Box<dyn AsyncRead + Send>>;

/// Parameters of a raw download.
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    pub files: Vec<FileSelector>,
    /// Ask the client to display a single file instead of saving it.
    pub inline: bool,
    /// Archive format name, see [`ArchiveFormat::from_algo`].
    pub algo: Option<String>,
    /// Name archive entries relative to each walked directory.
    pub flatten: bool,
}

/// A ready-to-stream download.
pub struct Download {
    pub file_name: String,
    pub size: u64,
    pub inline: bool,
    pub content_type: String,
    pub reader: DownloadReader,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("size", &self.size)
            .field("inline", &self.inline)
            .field("content_type", &self.content_type)
            .finish()
    }
}

pin_project! {
    /// Reads a built archive and deletes it once the reader is dropped.
    struct ArchiveReader {
        #[pin]
        file: tokio::fs::File,
        _temp: TempPath,
    }
}

impl AsyncRead for ArchiveReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.project().file.poll_read(cx, buf)
    }
}

/// Serves single files and archives to users and share visitors.
#[derive(Debug, Clone)]
pub struct DownloadService {
    sources: Arc<SourceManager>,
    gate: AccessGate,
    archives: ArchiveBuilder,
    shutdown: CancellationToken,
}

impl DownloadService {
    pub fn new(
        sources: Arc<SourceManager>,
        gate: AccessGate,
        archives: ArchiveBuilder,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            sources,
            gate,
            archives,
            shutdown,
        }
    }

    /// Prepare a download. A share download is counted once the stream is
    /// ready to start.
    pub async fn download(&self, actor: &Actor, req: DownloadRequest) -> AppResult<Download> {
        match actor {
            Actor::User(ctx) if !ctx.user.permissions.download && !ctx.is_admin() => {
                return Err(AppError::forbidden("User is not allowed to download"));
            }
            Actor::User(_) => {}
            Actor::Share(share) => share.authorize_download()?,
        }

        let download = match req.files.as_slice() {
            [] => return Err(AppError::validation("No files specified")),
            [only] => match self.single_file(actor, only, req.inline).await? {
                Some(download) => download,
                None => self.archive(actor, &req).await?,
            },
            _ => self.archive(actor, &req).await?,
        };

        if let Actor::Share(share) = actor {
            share.record_download()?;
        }
        info!(
            user = actor.username(),
            file = %download.file_name,
            size = download.size,
            "Download started"
        );
        Ok(self.throttle(actor, download))
    }

    /// `None` when the selector is a directory.
    async fn single_file(
        &self,
        actor: &Actor,
        selector: &FileSelector,
        inline: bool,
    ) -> AppResult<Option<Download>> {
        let (source, logical) = actor.scoped_path(&self.sources, &selector.source, &selector.path)?;
        if !actor.permits(&self.gate, &source, &logical) {
            return Err(AppError::forbidden(format!("Access denied to path {}", selector.path)));
        }
        let target = source.index.resolve_real_path(&logical).await?;
        if target.is_dir {
            return Ok(None);
        }

        let file = tokio::fs::File::open(&target.real_path).await?;
        let size = file.metadata().await?.len();
        let file_name = path::base_name(&logical);
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Some(Download {
            file_name,
            size,
            inline,
            content_type,
            reader: Box::pin(file),
        }))
    }

    async fn archive(&self, actor: &Actor, req: &DownloadRequest) -> AppResult<Download> {
        let format = ArchiveFormat::from_algo(req.algo.as_deref())?;
        let built = self.archives.build(&req.files, actor, format, req.flatten).await?;
        let file = tokio::fs::File::open(&built.path).await?;
        Ok(Download {
            file_name: format!("{}{}", built.name, format.extension()),
            size: built.size,
            inline: false,
            content_type: "application/octet-stream".to_string(),
            reader: Box::pin(ArchiveReader {
                file,
                _temp: built.path,
            }),
        })
    }

    fn throttle(&self, actor: &Actor, mut download: Download) -> Download {
        let Some(share) = actor.as_share() else {
            return download;
        };
        let kib = share.link.common.max_bandwidth;
        if kib == 0 {
            return download;
        }
        let inner = std::mem::replace(&mut download.reader, Box::pin(tokio::io::empty()));
        if let Some(throttled) = ThrottledReader::kib_per_second(inner, kib, self.shutdown.child_token()) {
            download.reader = Box::pin(throttled);
        }
        download
    }
}
