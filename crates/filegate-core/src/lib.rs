//! # filegate-core
//!
//! Core crate for Filegate. Provides the shared error type, layered
//! configuration, the collaborator traits the delivery pipeline consumes
//! (index, share persistence, preview cache, media metadata) and small
//! shared types.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
