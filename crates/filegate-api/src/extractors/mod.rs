//! Custom Axum extractors.

pub mod auth;
pub mod origin;

pub use auth::{AuthUser, MaybeUser};
pub use origin::Origin;
