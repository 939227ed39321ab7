//! Uploads and directory creation.

pub mod chunked;
pub mod upload;

pub use chunked::{ChunkRange, ChunkedUploadAssembler, UploadTarget};
pub use upload::{UploadOutcome, UploadRequest, UploadService};
