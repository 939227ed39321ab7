//! Core type definitions used across the Filegate workspace.

pub mod id;
pub mod listing;
pub mod media;
pub mod path;

pub use id::UserId;
pub use listing::{DirectoryListing, ItemInfo};
pub use media::{MediaKind, MediaMetadata};
