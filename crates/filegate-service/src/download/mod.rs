//! Raw downloads: single files and on-the-fly archives.

pub mod archive;
pub mod selector;
pub mod service;

pub use archive::{ArchiveBuilder, BuiltArchive};
pub use selector::FileSelector;
pub use service::{Download, DownloadReader, DownloadRequest, DownloadService};
