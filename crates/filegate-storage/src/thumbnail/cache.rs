//! On-disk preview cache keyed by the source file's real path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

use filegate_core::result::AppResult;
use filegate_core::traits::PreviewCache;

/// Keeps derived artifacts under `<cache>/previews/<sha256(real path)>/`.
#[derive(Debug, Clone)]
pub struct LocalPreviewCache {
    dir: PathBuf,
}

impl LocalPreviewCache {
    pub fn new(cache_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: cache_dir.as_ref().join("previews"),
        }
    }

    /// Directory holding every artifact derived from `real_path`.
    pub fn artifact_dir(&self, real_path: &Path) -> PathBuf {
        let key = Sha256::digest(real_path.to_string_lossy().as_bytes());
        self.dir.join(format!("{key:x}"))
    }
}

#[async_trait]
impl PreviewCache for LocalPreviewCache {
    async fn invalidate(&self, real_path: &Path) -> AppResult<()> {
        let dir = self.artifact_dir(real_path);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(path = %real_path.display(), "Invalidated previews");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
