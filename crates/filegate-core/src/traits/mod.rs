//! Collaborator traits defined in `filegate-core` and implemented by other crates.

pub mod index;
pub mod media;
pub mod preview;
pub mod repository;

pub use index::{IndexProvider, ReducedMetadata, ResolvedPath};
pub use media::MetadataExtractor;
pub use preview::PreviewCache;
pub use repository::{OwnedRepository, Repository};
