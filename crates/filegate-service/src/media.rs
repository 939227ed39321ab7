//! Media metadata extractor registry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use filegate_core::traits::MetadataExtractor;
use filegate_core::types::{ItemInfo, MediaKind};

/// Extractors keyed by the media kind they handle.
#[derive(Debug, Clone, Default)]
pub struct MediaExtractors {
    extractors: HashMap<MediaKind, Arc<dyn MetadataExtractor>>,
}

impl MediaExtractors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `extractor` for its kind, replacing any previous one.
    pub fn register(&mut self, extractor: Arc<dyn MetadataExtractor>) {
        self.extractors.insert(extractor.kind(), extractor);
    }

    pub fn get(&self, kind: MediaKind) -> Option<&Arc<dyn MetadataExtractor>> {
        self.extractors.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Attach tags to the audio and video items found in `dir`.
    ///
    /// Items without a matching extractor are left untouched; extraction
    /// failures are logged and skipped.
    pub async fn enrich(&self, items: &mut [ItemInfo], dir: &Path) {
        for item in items.iter_mut().filter(|i| i.kind.has_media_tags()) {
            let Some(extractor) = self.get(item.kind) else {
                continue;
            };
            let real_path = dir.join(&item.name);
            match extractor.extract(&real_path).await {
                Ok(metadata) => item.metadata = Some(metadata),
                Err(e) => warn!(file = %real_path.display(), error = %e, "Media metadata extraction failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use filegate_core::error::AppError;
    use filegate_core::result::AppResult;
    use filegate_core::types::MediaMetadata;

    use super::*;

    #[derive(Debug)]
    struct FixedAudio;

    #[async_trait]
    impl MetadataExtractor for FixedAudio {
        fn kind(&self) -> MediaKind {
            MediaKind::Audio
        }

        async fn extract(&self, real_path: &Path) -> AppResult<MediaMetadata> {
            if real_path.ends_with("broken.mp3") {
                return Err(AppError::validation("bad header"));
            }
            let mut metadata = MediaMetadata {
                duration_secs: Some(42),
                ..Default::default()
            };
            metadata.tags.insert("title".into(), "Song".into());
            Ok(metadata)
        }
    }

    #[tokio::test]
    async fn test_enrich_only_matching_kinds() {
        let mut registry = MediaExtractors::new();
        registry.register(Arc::new(FixedAudio));

        let mut items = vec![
            ItemInfo::new("song.mp3", 1, None),
            ItemInfo::new("broken.mp3", 1, None),
            ItemInfo::new("clip.mp4", 1, None),
            ItemInfo::new("notes.txt", 1, None),
        ];
        registry.enrich(&mut items, Path::new("/music")).await;

        assert_eq!(items[0].metadata.as_ref().unwrap().duration_secs, Some(42));
        assert!(items[1].metadata.is_none());
        assert!(items[2].metadata.is_none());
        assert!(items[3].metadata.is_none());
    }
}
