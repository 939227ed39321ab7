//! User account entities.

pub mod model;

pub use model::{Permissions, SourceScope, User};
