//! Share management handlers.

use axum::Json;
use axum::extract::{Query, State};

use filegate_entity::share::CreateShareBody;
use filegate_service::{DirectDownloadResponse, ShareView};

use crate::dto::request::{DirectDownloadQuery, HashQuery, PatchShareRequest, ResourceQuery};
use crate::dto::response::MessageResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, Origin};
use crate::state::AppState;

/// GET /api/shares
pub async fn list_shares(
    State(state): State<AppState>,
    auth: AuthUser,
    Origin(origin): Origin,
) -> Result<Json<Vec<ShareView>>, ApiError> {
    let shares = state.share_service.list(&auth, Some(&origin)).await?;
    Ok(Json(shares))
}

/// POST /api/shares
///
/// Creates a link, or updates the one named by `hash`.
pub async fn create_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Origin(origin): Origin,
    Json(body): Json<CreateShareBody>,
) -> Result<Json<ShareView>, ApiError> {
    let view = state
        .share_service
        .create_or_update(&auth, body, Some(&origin))
        .await?;
    Ok(Json(view))
}

/// PATCH /api/shares
pub async fn patch_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Origin(origin): Origin,
    Json(body): Json<PatchShareRequest>,
) -> Result<Json<ShareView>, ApiError> {
    let view = state
        .share_service
        .patch_path(&auth, &body.hash, &body.path, Some(&origin))
        .await?;
    Ok(Json(view))
}

/// DELETE /api/shares?hash=
pub async fn delete_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<HashQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.share_service.delete(&auth, &query.hash).await?;
    Ok(Json(MessageResponse {
        message: "Share deleted".to_string(),
    }))
}

/// GET /api/shares/path?source=&path=
pub async fn shares_for_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Origin(origin): Origin,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Vec<ShareView>>, ApiError> {
    let shares = state
        .share_service
        .shares_for_path(&auth, &query.source, &query.path, Some(&origin))
        .await?;
    Ok(Json(shares))
}

/// GET /api/shares/direct?source=&path=&duration=&count=&speed=
pub async fn direct_download(
    State(state): State<AppState>,
    auth: AuthUser,
    Origin(origin): Origin,
    Query(query): Query<DirectDownloadQuery>,
) -> Result<Json<DirectDownloadResponse>, ApiError> {
    let request = query.into_request()?;
    let response = state
        .share_service
        .create_direct_download(&auth, request, Some(&origin))
        .await?;
    Ok(Json(response))
}
