//! Share management: link lifecycle, public access and URL building.

pub mod access;
pub mod link;
pub mod service;

pub use access::{ShareAccessService, ShareCredentials};
pub use link::{LinkService, RequestOrigin};
pub use service::{
    DirectDownloadRequest, DirectDownloadResponse, ShareService, ShareView,
    find_equivalent_quick_share,
};
