//! Endpoints for share visitors.
//!
//! The share is resolved first; everything after that acts as the share
//! and sees paths relative to the shared directory.

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;

use filegate_entity::share::CommonShare;
use filegate_entity::user::User;
use filegate_service::{
    Actor, DownloadRequest, FileSelector, Resource, ShareCredentials, UploadRequest,
};

use super::raw::download_response;
use super::{body_reader, chunk_range};
use crate::dto::request::{HashQuery, PublicQuery};
use crate::dto::response::UploadResponse;
use crate::error::ApiError;
use crate::extractors::{MaybeUser, Origin};
use crate::state::AppState;

/// Header a visitor sends the share password in.
pub const SHARE_PASSWORD_HEADER: &str = "x-share-password";

/// GET /public/api/share/info?hash=
pub async fn share_info(
    State(state): State<AppState>,
    Origin(origin): Origin,
    Query(query): Query<HashQuery>,
) -> Result<Json<CommonShare>, ApiError> {
    let info = state.share_service.info(&query.hash, Some(&origin)).await?;
    Ok(Json(info))
}

/// GET /public/api/raw?hash=&files=&token=
pub async fn download(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    headers: HeaderMap,
    Query(query): Query<PublicQuery>,
) -> Result<Response, ApiError> {
    let actor = resolve(&state, &query, &headers, viewer).await?;
    let files = if query.files.is_empty() { "/" } else { &query.files };
    let request = DownloadRequest {
        files: FileSelector::parse_list(files)?,
        inline: query.inline,
        algo: query.algo,
        flatten: query.flatten,
    };
    let download = state.download_service.download(&actor, request).await?;
    download_response(download)
}

/// GET /public/api/resources?hash=&path=
pub async fn get_resource(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    headers: HeaderMap,
    Query(query): Query<PublicQuery>,
) -> Result<Json<Resource>, ApiError> {
    let actor = resolve(&state, &query, &headers, viewer).await?;
    let path = if query.path.is_empty() { "/" } else { &query.path };
    let resource = state
        .resource_service
        .get(&actor, "", path, query.metadata)
        .await?;
    Ok(Json(resource))
}

/// POST /public/api/resources?hash=&path=
pub async fn upload(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    headers: HeaderMap,
    Query(query): Query<PublicQuery>,
    body: Body,
) -> Result<Json<UploadResponse>, ApiError> {
    let actor = resolve(&state, &query, &headers, viewer).await?;
    let request = UploadRequest {
        source: String::new(),
        path: query.path,
        override_existing: query.override_existing,
        is_dir: query.is_dir,
        chunk: chunk_range(&headers)?,
    };
    let mut reader = body_reader(body);
    let outcome = state
        .upload_service
        .upload(&actor, request, &mut reader)
        .await?;
    Ok(Json(UploadResponse { outcome }))
}

async fn resolve(
    state: &AppState,
    query: &PublicQuery,
    headers: &HeaderMap,
    viewer: Option<Arc<User>>,
) -> Result<Actor, ApiError> {
    let credentials = ShareCredentials {
        token: query.token.clone(),
        password: headers
            .get(SHARE_PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    };
    let share = state
        .access_service
        .resolve(&query.hash, &credentials, viewer)
        .await?;
    Ok(Actor::Share(share))
}
