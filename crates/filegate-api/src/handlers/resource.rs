//! Listing and upload handlers for logged-in users.

use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::HeaderMap;

use filegate_service::{Actor, Resource, UploadRequest};

use super::{body_reader, chunk_range};
use crate::dto::request::{ResourceQuery, UploadQuery};
use crate::dto::response::UploadResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/resources?source=&path=&metadata=
pub async fn get_resource(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Resource>, ApiError> {
    let path = if query.path.is_empty() { "/" } else { &query.path };
    let resource = state
        .resource_service
        .get(&Actor::User(auth.0), &query.source, path, query.metadata)
        .await?;
    Ok(Json(resource))
}

/// POST /api/resources?source=&path=&override=&isDir=
///
/// The body is the raw file content, or one chunk of it when the chunk
/// headers are present.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<UploadResponse>, ApiError> {
    let request = UploadRequest {
        source: query.source,
        path: query.path,
        override_existing: query.override_existing,
        is_dir: query.is_dir,
        chunk: chunk_range(&headers)?,
    };
    let mut reader = body_reader(body);
    let outcome = state
        .upload_service
        .upload(&Actor::User(auth.0), request, &mut reader)
        .await?;
    Ok(Json(UploadResponse { outcome }))
}
