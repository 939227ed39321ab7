//! Share link entities.

pub mod counters;
pub mod model;

pub use counters::{CounterSnapshot, DownloadCounters};
pub use model::{CommonShare, CreateShareBody, ExpiryUnit, Link, ShareType, SidebarLink};
