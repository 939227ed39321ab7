//! Route handlers organized by domain.

pub mod health;
pub mod public;
pub mod raw;
pub mod resource;
pub mod share;

use axum::body::Body;
use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use axum::http::HeaderMap;
use filegate_core::result::AppResult;
use filegate_service::ChunkRange;

/// Header carrying the byte offset of an upload chunk.
pub const CHUNK_OFFSET_HEADER: &str = "x-file-chunk-offset";
/// Header carrying the final size of a chunked upload.
pub const TOTAL_SIZE_HEADER: &str = "x-file-total-size";

/// Adapt a request body into an `AsyncRead`.
pub(crate) fn body_reader(body: Body) -> impl AsyncRead + Unpin + Send {
    StreamReader::new(body.into_data_stream().map_err(std::io::Error::other))
}

/// Chunk range from the upload headers, `None` for a whole-file upload.
pub(crate) fn chunk_range(headers: &HeaderMap) -> AppResult<Option<ChunkRange>> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    ChunkRange::from_headers(header(CHUNK_OFFSET_HEADER), header(TOTAL_SIZE_HEADER))
}
