//! Scheme and host the client addressed, for building absolute share URLs.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use filegate_service::RequestOrigin;

#[derive(Debug, Clone)]
pub struct Origin(pub RequestOrigin);

impl<S: Send + Sync> FromRequestParts<S> for Origin {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());
        Ok(Origin(RequestOrigin::from_headers(
            header("host"),
            header("x-forwarded-host"),
            header("x-forwarded-proto"),
        )))
    }
}
