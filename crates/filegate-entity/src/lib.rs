//! # filegate-entity
//!
//! Domain entity models for Filegate. Share links and their embedded
//! configuration, path access rules, and user accounts. Entities are plain
//! serde data; the only interior mutability is the per-link download
//! counter lock.

pub mod access;
pub mod share;
pub mod user;
