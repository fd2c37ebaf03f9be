//! Offline-first synchronization between the remote server and the local
//! sqlite cache.
//!
//! Read paths try the server first and fall back to cached data; write paths
//! are online-only. Pushed records are merged into the cache by id.

mod manager;

pub use manager::{LogListing, SyncError, SyncManager};
