use thiserror::Error;

/// Failures reported on `storage_failure`, rendered as the host-facing reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("List failed: {0}")]
    List(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
