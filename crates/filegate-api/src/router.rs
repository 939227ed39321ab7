//! Route definitions for the Filegate HTTP API.
//!
//! Authenticated routes live under `/api`, share visitors use
//! `/public/api`. Everything is mounted under `server.base_url`.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .merge(health_routes())
        .merge(resource_routes())
        .merge(share_routes())
        .merge(public_routes())
        // Upload bodies are streamed to disk.
        .layer(DefaultBodyLimit::disable());

    let base = state.config.server.base_url.trim_end_matches('/').to_string();
    let router = if base.is_empty() {
        routes
    } else {
        Router::new().nest(&base, routes)
    };
    router.with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Listings, uploads and raw downloads for logged-in users
fn resource_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/resources",
            get(handlers::resource::get_resource).post(handlers::resource::upload),
        )
        .route("/api/raw", get(handlers::raw::download))
}

/// Share management
fn share_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/shares",
            get(handlers::share::list_shares)
                .post(handlers::share::create_share)
                .patch(handlers::share::patch_share)
                .delete(handlers::share::delete_share),
        )
        .route("/api/shares/path", get(handlers::share::shares_for_path))
        .route("/api/shares/direct", get(handlers::share::direct_download))
}

/// Share visitors
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/public/api/share/info", get(handlers::public::share_info))
        .route("/public/api/raw", get(handlers::public::download))
        .route(
            "/public/api/resources",
            get(handlers::public::get_resource).post(handlers::public::upload),
        )
}
