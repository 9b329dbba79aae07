//! # Blob-Store Adapter
//!
//! Uploads, downloads, deletes and lists blobs through a
//! [`BlobBackend`](bridge_traits::BlobBackend).
//!
//! Upload, download and delete report a boolean `storage_*_success` event and,
//! when they fail, an additional `storage_failure` carrying the reason.
//! Listing reports `storage_list_success` or `storage_failure` only.

pub mod error;
pub mod manager;

pub use error::{Result, StorageError};
pub use manager::StorageManager;
