//! # filegate-auth
//!
//! Authorization primitives for the delivery pipeline.
//!
//! ## Modules
//!
//! - `access`: longest-prefix path policy over immutable rule snapshots,
//!   and the gate that filters directory listings with it
//! - `password`: share password hashing (bcrypt or Argon2id)

pub mod access;
pub mod password;

pub use access::{AccessGate, PathPolicy, Principal, RuleSet, RuleSetBuilder};
pub use password::PasswordHasher;
