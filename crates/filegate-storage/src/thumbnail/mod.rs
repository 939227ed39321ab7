//! Preview artifact cache.

pub mod cache;

pub use cache::LocalPreviewCache;
