//! # filegate-storage
//!
//! Filesystem-facing building blocks: the source registry and the local
//! reference index, the chunked-upload temp file writer, zip/tar.gz
//! archive sinks, the bandwidth throttle and the preview cache.

pub mod archive;
pub mod chunked;
pub mod manager;
pub mod providers;
pub mod thumbnail;
pub mod throttle;

pub use archive::{ArchiveFormat, ArchiveWriter};
pub use chunked::ChunkWriter;
pub use manager::{Source, SourceManager};
pub use providers::local::LocalIndex;
pub use thumbnail::LocalPreviewCache;
pub use throttle::ThrottledReader;
