//! # filegate-database
//!
//! Repository implementations for Filegate entities. Share links live in
//! memory and are snapshotted to a JSON file; users are seeded from
//! configuration.

pub mod repositories;

pub use repositories::share::ShareRepository;
pub use repositories::user::UserRepository;
