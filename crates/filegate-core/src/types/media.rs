//! Media classification.
//!
//! Files are classified once, when an [`ItemInfo`](super::ItemInfo) is
//! built, and the resulting [`MediaKind`] is carried from then on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Closed set of media kinds the pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
    Image,
    Text,
    Other,
}

impl MediaKind {
    /// Classify a file by its name.
    pub fn classify(name: &str) -> Self {
        let Some(mime) = mime_guess::from_path(name).first() else {
            return Self::Other;
        };
        match mime.type_().as_str() {
            "audio" => Self::Audio,
            "video" => Self::Video,
            "image" => Self::Image,
            "text" => Self::Text,
            _ => Self::Other,
        }
    }

    /// Audio and video files may carry extractable tags.
    pub fn has_media_tags(self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }
}

/// Tags extracted from an audio or video file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Play length in seconds.
    pub duration_secs: Option<u64>,
    /// Free-form tags (title, artist, album, ...).
    pub tags: BTreeMap<String, String>,
}
