//! Concrete repository implementations.

pub mod share;
pub mod user;
