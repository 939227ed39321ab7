//! # filegate-service
//!
//! Business logic for the access-controlled delivery pipeline. Each service
//! is built from `Arc`'d collaborators at startup and is cheap to clone.
//!
//! Every request first resolves an [`Actor`]: a logged-in user confined to
//! their scope and the path policy, or an active share link.

pub mod context;
pub mod download;
pub mod file;
pub mod media;
pub mod resource;
pub mod share;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{Actor, RequestContext, ShareActor};
pub use download::{
    ArchiveBuilder, BuiltArchive, Download, DownloadRequest, DownloadService, FileSelector,
};
pub use file::{
    ChunkRange, ChunkedUploadAssembler, UploadOutcome, UploadRequest, UploadService, UploadTarget,
};
pub use media::MediaExtractors;
pub use resource::{Resource, ResourceService};
pub use share::{
    DirectDownloadRequest, DirectDownloadResponse, LinkService, RequestOrigin, ShareAccessService,
    ShareCredentials, ShareService, ShareView,
};
