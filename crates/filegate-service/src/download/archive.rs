//! Archive assembly over a policy-filtered directory walk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempPath;
use tracing::{debug, info};
use walkdir::WalkDir;

use filegate_auth::{AccessGate, Principal, RuleSet};
use filegate_core::error::{AppError, ErrorKind};
use filegate_core::result::AppResult;
use filegate_core::types::path;
use filegate_storage::{ArchiveFormat, ArchiveWriter, Source, SourceManager};

use super::selector::FileSelector;
use crate::context::Actor;

/// A selector after scope mapping and resolution.
#[derive(Debug, Clone)]
struct ResolvedSelector {
    source: Source,
    logical: String,
    real_path: PathBuf,
    is_dir: bool,
}

/// A finished archive in the cache directory.
///
/// The file is removed when `path` is dropped.
#[derive(Debug)]
pub struct BuiltArchive {
    pub path: TempPath,
    /// Download name without extension.
    pub name: String,
    pub size: u64,
    pub entries: usize,
}

/// Who the walk is checked for. Shares are not checked.
enum WalkCheck {
    Share,
    User {
        rules: Arc<RuleSet>,
        username: String,
        groups: Vec<String>,
    },
}

impl WalkCheck {
    fn permitted(&self, source_root: &str, logical: &str) -> bool {
        match self {
            Self::Share => true,
            Self::User {
                rules,
                username,
                groups,
            } => rules.permitted(
                source_root,
                logical,
                Principal {
                    username,
                    groups,
                },
            ),
        }
    }
}

/// Builds zip or tar.gz archives from download selectors.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    sources: Arc<SourceManager>,
    gate: AccessGate,
    cache_dir: PathBuf,
    max_size: Option<u64>,
}

impl ArchiveBuilder {
    pub fn new(
        sources: Arc<SourceManager>,
        gate: AccessGate,
        cache_dir: impl Into<PathBuf>,
        max_size: Option<u64>,
    ) -> Self {
        Self {
            sources,
            gate,
            cache_dir: cache_dir.into(),
            max_size,
        }
    }

    /// Combined size of every permitted selector.
    pub async fn estimate_size(&self, selectors: &[FileSelector], actor: &Actor) -> AppResult<u64> {
        let resolved = self.resolve(selectors, actor).await?;
        self.total_size(&resolved).await
    }

    /// Write the archive to a temp file in the cache directory.
    ///
    /// Denied top-level selectors are skipped. Fails with `PayloadTooLarge`
    /// before writing anything when the size cap is exceeded.
    pub async fn build(
        &self,
        selectors: &[FileSelector],
        actor: &Actor,
        format: ArchiveFormat,
        flatten: bool,
    ) -> AppResult<BuiltArchive> {
        let resolved = self.resolve(selectors, actor).await?;
        if resolved.is_empty() {
            return Err(AppError::forbidden("Access denied to every requested path"));
        }

        let size = self.total_size(&resolved).await?;
        if let Some(max) = self.max_size {
            if size > max {
                return Err(AppError::too_large(format!(
                    "Archive of {size} bytes exceeds the limit of {max} bytes"
                )));
            }
        }

        let name = archive_name(&resolved);
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let (file, temp_path) = tempfile::Builder::new()
            .prefix("archive-")
            .suffix(format.extension())
            .tempfile_in(&self.cache_dir)?
            .into_parts();

        let check = match actor {
            Actor::Share(_) => WalkCheck::Share,
            Actor::User(ctx) => WalkCheck::User {
                rules: self.gate.policy().snapshot(),
                username: ctx.user.username.clone(),
                groups: ctx.user.groups.clone(),
            },
        };
        let entries = tokio::task::spawn_blocking(move || {
            let mut writer = ArchiveWriter::new(format, file);
            for selector in &resolved {
                write_selector(&mut writer, selector, &check, flatten)?;
            }
            let entries = writer.entries();
            writer.finish()?;
            Ok::<_, AppError>(entries)
        })
        .await
        .map_err(|e| AppError::internal(format!("Archive task failed: {e}")))??;

        let size = tokio::fs::metadata(&temp_path).await?.len();
        info!(user = actor.username(), entries, size, "Archive built");
        Ok(BuiltArchive {
            path: temp_path,
            name,
            size,
            entries,
        })
    }

    async fn resolve(&self, selectors: &[FileSelector], actor: &Actor) -> AppResult<Vec<ResolvedSelector>> {
        let mut resolved = Vec::with_capacity(selectors.len());
        for selector in selectors {
            let (source, logical) = actor.scoped_path(&self.sources, &selector.source, &selector.path)?;
            if !actor.permits(&self.gate, &source, &logical) {
                debug!(path = %logical, user = actor.username(), "Skipping denied selector");
                continue;
            }
            let target = source.index.resolve_real_path(&logical).await?;
            resolved.push(ResolvedSelector {
                source,
                logical,
                real_path: target.real_path,
                is_dir: target.is_dir,
            });
        }
        Ok(resolved)
    }

    async fn total_size(&self, resolved: &[ResolvedSelector]) -> AppResult<u64> {
        let mut total = 0u64;
        for selector in resolved {
            let index = &selector.source.index;
            let size = match index.reduced_metadata(&selector.logical, selector.is_dir).await {
                Some(meta) => meta.size,
                None => index.fresh_metadata(&selector.logical).await?.size,
            };
            total = total.saturating_add(size);
        }
        Ok(total)
    }
}

/// First selector's parent folder name, or a single directory's own name.
fn archive_name(resolved: &[ResolvedSelector]) -> String {
    let name = match resolved {
        [only] if only.is_dir => path::base_name(&only.logical),
        [first, ..] => path::base_name(&path::parent_dir(&first.logical)),
        [] => String::new(),
    };
    if name.is_empty() || name == "/" {
        "download".to_string()
    } else {
        name
    }
}

fn write_selector(
    writer: &mut ArchiveWriter,
    selector: &ResolvedSelector,
    check: &WalkCheck,
    flatten: bool,
) -> AppResult<()> {
    if !selector.is_dir {
        writer.add_file(&path::base_name(&selector.logical), &selector.real_path)?;
        return Ok(());
    }

    let source_root = selector.source.root();
    let base = if flatten {
        String::new()
    } else {
        path::base_name(&selector.logical)
    };

    let mut walker = WalkDir::new(&selector.real_path)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to walk directory for archive", e)
        })?;
        let file_type = entry.file_type();
        if file_type.is_symlink() {
            debug!(path = %entry.path().display(), "Skipping symlink");
            continue;
        }

        let rel = relative_unix(&selector.real_path, entry.path());
        let logical = path::join_unix(&selector.logical, &rel);
        if !check.permitted(&source_root, &logical) {
            debug!(path = %logical, "Pruning denied entry from archive");
            if file_type.is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        let name = if base.is_empty() {
            rel
        } else {
            format!("{base}/{rel}")
        };
        if file_type.is_dir() {
            let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
            writer.add_directory(&name, modified)?;
        } else {
            writer.add_file(&name, entry.path())?;
        }
    }
    Ok(())
}

fn relative_unix(root: &Path, entry: &Path) -> String {
    entry
        .strip_prefix(root)
        .unwrap_or(entry)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
