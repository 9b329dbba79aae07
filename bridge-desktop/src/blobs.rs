//! Blob store backed by a local directory, using `tokio::fs`.

use async_trait::async_trait;
use bridge_traits::{
    blob::{BlobBackend, BlobListing},
    error::{BridgeError, Result},
};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub const OBJECT_NOT_FOUND: &str = "Object does not exist at location.";

/// Maps blob paths onto files below `root`. Sub-directories are reported as
/// folders with a trailing `/`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a blob path below the root. Rejects absolute paths and `..`.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(BridgeError::backend(format!("Invalid storage path '{}'", path)));
        }
        Ok(self.root.join(relative))
    }

    fn map_io_error(e: std::io::Error) -> BridgeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            BridgeError::backend(OBJECT_NOT_FOUND)
        } else {
            BridgeError::Io(e)
        }
    }
}

#[async_trait]
impl BlobBackend for LocalBlobStore {
    async fn upload(&self, path: &str, local_path: &Path) -> Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        // A missing source file is a local problem, not a missing object.
        let size = fs::copy(local_path, &target).await?;
        debug!(path, size, "Stored blob");
        Ok(())
    }

    async fn download(&self, path: &str, dest_path: &Path) -> Result<()> {
        let source = self.resolve(path)?;
        if !fs::try_exists(&source).await? {
            return Err(BridgeError::backend(OBJECT_NOT_FOUND));
        }
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(&source, dest_path).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        fs::remove_file(&target).await.map_err(Self::map_io_error)?;
        debug!(path, "Deleted blob");
        Ok(())
    }

    /// Missing directories list as empty.
    async fn list_all(&self, path: &str) -> Result<BlobListing> {
        let dir = self.resolve(path)?;
        let mut listing = BlobListing::default();

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(listing),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().await?.is_dir() {
                listing.prefixes.push(format!("{}/", name));
            } else {
                listing.items.push(name);
            }
        }

        listing.items.sort();
        listing.prefixes.sort();
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_list_download_delete() {
        let bucket = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(bucket.path());

        let source = scratch.path().join("a.png");
        std::fs::write(&source, b"png").unwrap();

        store.upload("images/b.png", &source).await.unwrap();
        store.upload("images/a.png", &source).await.unwrap();
        store.upload("images/thumbs/a.png", &source).await.unwrap();

        let listing = store.list_all("images/").await.unwrap();
        assert_eq!(listing.items, vec!["a.png", "b.png"]);
        assert_eq!(listing.prefixes, vec!["thumbs/"]);

        let dest = scratch.path().join("out/a.png");
        store.download("images/a.png", &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"png");

        store.delete("images/a.png").await.unwrap();
        let error = store.delete("images/a.png").await.unwrap_err();
        assert_eq!(error.to_string(), OBJECT_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_objects() {
        let bucket = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(bucket.path());

        let listing = store.list_all("nothing/here").await.unwrap();
        assert!(listing.items.is_empty() && listing.prefixes.is_empty());

        let error = store
            .download("nothing.bin", &bucket.path().join("x"))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), OBJECT_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_paths_cannot_escape_root() {
        let bucket = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(bucket.path());
        assert!(store.delete("../outside.txt").await.is_err());
    }
}
