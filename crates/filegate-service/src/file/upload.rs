//! Upload entry point for users and upload shares.

use std::io;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::AsyncRead;
use tracing::info;

use filegate_auth::AccessGate;
use filegate_core::error::AppError;
use filegate_core::result::AppResult;
use filegate_storage::{Source, SourceManager};

use super::chunked::{ChunkRange, ChunkedUploadAssembler, UploadTarget, spawn_refresh};
use crate::context::Actor;

/// Parameters of an upload request.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub source: String,
    pub path: String,
    pub override_existing: bool,
    /// Create a directory instead of a file. A trailing `/` on `path` does
    /// the same.
    pub is_dir: bool,
    /// Present for chunked uploads.
    pub chunk: Option<ChunkRange>,
}

/// What an upload call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadOutcome {
    DirectoryCreated,
    /// A chunk was stored; more are expected.
    ChunkAccepted,
    /// The file is in place.
    Completed,
}

/// Writes uploaded files and creates directories.
#[derive(Debug, Clone)]
pub struct UploadService {
    sources: Arc<SourceManager>,
    gate: AccessGate,
    assembler: ChunkedUploadAssembler,
}

impl UploadService {
    pub fn new(sources: Arc<SourceManager>, gate: AccessGate, assembler: ChunkedUploadAssembler) -> Self {
        Self {
            sources,
            gate,
            assembler,
        }
    }

    pub async fn upload<R>(&self, actor: &Actor, req: UploadRequest, body: &mut R) -> AppResult<UploadOutcome>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        if req.path.is_empty() {
            return Err(AppError::validation("Upload path is required"));
        }
        let is_dir = req.is_dir || req.path.ends_with('/');
        let (source, logical) = actor.scoped_path(&self.sources, &req.source, &req.path)?;
        if logical == "/" {
            return Err(AppError::validation("Cannot upload onto the source root"));
        }

        let real_path = source.index.root().join(logical.trim_start_matches('/'));
        let existing = match tokio::fs::metadata(&real_path).await {
            Ok(meta) => Some(meta),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        check_write_permission(actor, existing.is_some() && req.override_existing)?;
        if !actor.permits(&self.gate, &source, &logical) {
            return Err(AppError::forbidden(format!("Access denied to path {}", req.path)));
        }

        let target = UploadTarget {
            index: Arc::clone(&source.index),
            logical,
            real_path,
        };

        if is_dir {
            return self.create_directory(actor, &source, &target, existing.map(|m| m.is_dir())).await;
        }
        if existing.as_ref().is_some_and(|m| m.is_dir()) {
            return Err(AppError::conflict(format!(
                "A directory already exists at {}",
                target.logical
            )));
        }

        match req.chunk {
            Some(range) => {
                let complete = self
                    .assembler
                    .write_chunk(&target, range, req.override_existing, body)
                    .await?;
                if !complete {
                    return Ok(UploadOutcome::ChunkAccepted);
                }
                info!(user = actor.username(), path = %target.logical, size = range.total_size, "Upload completed");
            }
            None => {
                let size = self
                    .assembler
                    .write_whole(&target, req.override_existing, body)
                    .await?;
                info!(user = actor.username(), path = %target.logical, size, "Upload completed");
            }
        }
        Ok(UploadOutcome::Completed)
    }

    async fn create_directory(
        &self,
        actor: &Actor,
        source: &Source,
        target: &UploadTarget,
        existing_is_dir: Option<bool>,
    ) -> AppResult<UploadOutcome> {
        match existing_is_dir {
            Some(true) => return Ok(UploadOutcome::DirectoryCreated),
            Some(false) => {
                return Err(AppError::conflict(format!(
                    "A file already exists at {}",
                    target.logical
                )));
            }
            None => {}
        }
        tokio::fs::create_dir_all(&target.real_path).await?;
        spawn_refresh(target);
        info!(
            user = actor.username(),
            source = source.name(),
            path = %target.logical,
            "Directory created"
        );
        Ok(UploadOutcome::DirectoryCreated)
    }
}

/// `replacing` selects the modify permission instead of create.
fn check_write_permission(actor: &Actor, replacing: bool) -> AppResult<()> {
    let allowed = match actor {
        Actor::User(ctx) if ctx.is_admin() => true,
        Actor::User(ctx) if replacing => ctx.user.permissions.modify,
        Actor::User(ctx) => ctx.user.permissions.create,
        Actor::Share(share) if replacing => {
            share.link.common.allow_modify || share.link.common.allow_replacements
        }
        Actor::Share(share) => share.link.common.allow_create,
    };
    if allowed {
        Ok(())
    } else if replacing {
        Err(AppError::forbidden("Not allowed to replace existing files"))
    } else {
        Err(AppError::forbidden("Not allowed to create files"))
    }
}
