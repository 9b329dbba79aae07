//! Blob Store Bridge

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Immediate children of a blob path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobListing {
    /// Names of blobs directly under the path.
    pub items: Vec<String>,
    /// Names of sub-prefixes ("folders") directly under the path.
    pub prefixes: Vec<String>,
}

/// Remote blob storage addressed by slash-separated paths.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Upload the local file at `local_path` to `path`.
    async fn upload(&self, path: &str, local_path: &Path) -> Result<()>;

    /// Download `path` into the local file `dest_path`, replacing it.
    async fn download(&self, path: &str, dest_path: &Path) -> Result<()>;

    async fn delete(&self, path: &str) -> Result<()>;

    /// List immediate children only; never recursive.
    async fn list_all(&self, path: &str) -> Result<BlobListing>;
}
