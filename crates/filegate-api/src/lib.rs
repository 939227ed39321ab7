//! # filegate-api
//!
//! HTTP API layer for Filegate built on Axum.
//!
//! Provides the REST endpoints for listings, raw downloads, uploads and
//! share management, the public share endpoints, the proxy-header user
//! extractor and the `AppError` to HTTP mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use state::AppState;
