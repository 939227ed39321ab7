//! Share link repository.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use filegate_core::error::{AppError, ErrorKind};
use filegate_core::result::AppResult;
use filegate_core::traits::{OwnedRepository, Repository};
use filegate_core::types::UserId;
use filegate_entity::share::Link;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone)]
struct Stored {
    seq: u64,
    link: Arc<Link>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    links: Vec<Link>,
}

/// In-memory share store keyed by hash, with an optional JSON snapshot file.
///
/// Listing order is insertion order; replacing a link keeps its position.
#[derive(Debug, Default)]
pub struct ShareRepository {
    links: DashMap<String, Stored>,
    next_seq: AtomicU64,
    snapshot: Option<PathBuf>,
    flush_lock: tokio::sync::Mutex<()>,
}

impl ShareRepository {
    /// Create an empty, memory-only repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a repository backed by `path`, loading it when it exists.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let repo = Self {
            snapshot: Some(path.clone()),
            ..Self::default()
        };

        match tokio::fs::read(&path).await {
            Ok(raw) => {
                let snapshot: Snapshot = serde_json::from_slice(&raw)?;
                for link in snapshot.links {
                    repo.insert(Arc::new(link));
                }
                info!(path = %path.display(), links = repo.links.len(), "Loaded share snapshot");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No share snapshot yet");
            }
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read share snapshot {}", path.display()),
                    e,
                ));
            }
        }
        Ok(repo)
    }

    /// Write every link (with its counters) to the snapshot file.
    pub async fn flush(&self) -> AppResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        let _guard = self.flush_lock.lock().await;
        let links = self.ordered().into_iter().map(|l| (*l).clone()).collect();
        let raw = serde_json::to_vec_pretty(&Snapshot {
            version: SNAPSHOT_VERSION,
            links,
        })?;
        write_atomic(path, &raw).await?;
        debug!(path = %path.display(), "Flushed share snapshot");
        Ok(())
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn insert(&self, link: Arc<Link>) {
        self.links
            .entry(link.hash.clone())
            .and_modify(|stored| stored.link = Arc::clone(&link))
            .or_insert_with(|| Stored {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                link,
            });
    }

    fn ordered(&self) -> Vec<Arc<Link>> {
        let mut stored: Vec<Stored> = self.links.iter().map(|e| e.value().clone()).collect();
        stored.sort_by_key(|s| s.seq);
        stored.into_iter().map(|s| s.link).collect()
    }
}

async fn write_atomic(path: &Path, raw: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, raw).await?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to replace share snapshot {}", path.display()),
            e,
        )
    })
}

#[async_trait]
impl Repository<Link, str> for ShareRepository {
    async fn load(&self, hash: &str) -> AppResult<Option<Arc<Link>>> {
        Ok(self.links.get(hash).map(|s| Arc::clone(&s.link)))
    }

    async fn save(&self, link: Arc<Link>) -> AppResult<()> {
        self.insert(link);
        self.flush().await
    }

    async fn delete(&self, hash: &str) -> AppResult<bool> {
        let removed = self.links.remove(hash).is_some();
        if removed {
            self.flush().await?;
        }
        Ok(removed)
    }

    async fn list_all(&self) -> AppResult<Vec<Arc<Link>>> {
        Ok(self.ordered())
    }
}

#[async_trait]
impl OwnedRepository<Link, str> for ShareRepository {
    async fn list_by_user(&self, user_id: &UserId) -> AppResult<Vec<Arc<Link>>> {
        Ok(self
            .ordered()
            .into_iter()
            .filter(|l| l.user_id == *user_id)
            .collect())
    }
}
