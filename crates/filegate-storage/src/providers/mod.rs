//! Index implementations.

pub mod local;
