//! End-to-end tests driving the router in-process.

mod helpers;

mod download_test;
mod listing_test;
mod share_test;
mod upload_test;
