//! Raw downloads: single files and on-the-fly archives.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio_util::io::ReaderStream;

use filegate_core::error::AppError;
use filegate_service::{Actor, Download, DownloadRequest, FileSelector};

use crate::dto::request::RawQuery;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// RFC 5987 `attr-char` minus the alphanumerics.
const FILENAME_STAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~');

/// GET /api/raw?files=source::path||source::path
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RawQuery>,
) -> Result<Response, ApiError> {
    let request = DownloadRequest {
        files: FileSelector::parse_list(&query.files)?,
        inline: query.inline,
        algo: query.algo,
        flatten: query.flatten,
    };
    let download = state
        .download_service
        .download(&Actor::User(auth.0), request)
        .await?;
    download_response(download)
}

/// Stream a prepared download with its headers.
pub(crate) fn download_response(download: Download) -> Result<Response, ApiError> {
    let disposition = content_disposition(&download.file_name, download.inline);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, download.size)
        .header(header::CACHE_CONTROL, "private")
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(Body::from_stream(ReaderStream::new(download.reader)))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;
    Ok(response)
}

/// `attachment; filename="ascii"; filename*=utf-8''encoded`
pub(crate) fn content_disposition(file_name: &str, inline: bool) -> String {
    let kind = if inline { "inline" } else { "attachment" };
    let ascii: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, FILENAME_STAR);
    format!("{kind}; filename=\"{ascii}\"; filename*=utf-8''{encoded}")
}
