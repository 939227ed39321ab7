//! Directory listing types returned by the index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::media::{MediaKind, MediaMetadata};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    /// Entry name (no path separators).
    pub name: String,
    /// Size in bytes (recursive for directories when known).
    pub size: u64,
    /// Last modification time.
    pub modified: Option<DateTime<Utc>>,
    /// Media classification, fixed at listing time.
    pub kind: MediaKind,
    /// Extracted media tags, filled only on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MediaMetadata>,
}

impl ItemInfo {
    /// Build an item, classifying its media kind from the name.
    pub fn new(name: impl Into<String>, size: u64, modified: Option<DateTime<Utc>>) -> Self {
        let name = name.into();
        let kind = MediaKind::classify(&name);
        Self {
            name,
            size,
            modified,
            kind,
            metadata: None,
        }
    }
}

/// Contents of one directory, split into sub-directories and files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryListing {
    /// Logical path of the directory.
    pub path: String,
    pub folders: Vec<ItemInfo>,
    pub files: Vec<ItemInfo>,
}

impl DirectoryListing {
    /// Iterate over the names of every entry, folders first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.folders
            .iter()
            .chain(self.files.iter())
            .map(|item| item.name.as_str())
    }

    /// Returns `true` when the listing holds no entries.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}
