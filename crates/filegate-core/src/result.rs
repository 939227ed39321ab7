//! Convenience result type alias.

use crate::error::AppError;

/// A `Result` type alias using [`AppError`] as the error variant.
///
/// Used throughout all Filegate crates for consistent error handling.
pub type AppResult<T> = Result<T, AppError>;
