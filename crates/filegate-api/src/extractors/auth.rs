//! User extraction from the trusted proxy header.
//!
//! Filegate sits behind an authenticating proxy which forwards the
//! username in a configurable header (`auth.proxy_header`).

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use filegate_core::error::AppError;
use filegate_entity::user::User;
use filegate_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = lookup_user(parts, state)?
            .ok_or_else(|| AppError::unauthorized("Missing user identity header"))?;

        let ip_address = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(AuthUser(RequestContext::new(user, ip_address, user_agent)))
    }
}

/// The logged-in viewer of a public request, if any.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Arc<User>>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(lookup_user(parts, state)?))
    }
}

/// `Ok(None)` without the header; an unknown username is rejected.
fn lookup_user(parts: &Parts, state: &AppState) -> Result<Option<Arc<User>>, ApiError> {
    let Some(value) = parts.headers.get(state.config.auth.proxy_header.as_str()) else {
        return Ok(None);
    };
    let username = value
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid user identity header"))?
        .trim();
    if username.is_empty() {
        return Ok(None);
    }
    let user = state
        .users
        .find_by_username(username)
        .ok_or_else(|| AppError::unauthorized(format!("Unknown user '{username}'")))?;
    Ok(Some(user))
}
