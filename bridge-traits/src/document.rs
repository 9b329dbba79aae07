//! Document Store Bridge

use async_trait::async_trait;

use crate::{error::Result, record::Record};

/// Remote document database organised as collections of keyed documents.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Create a document with a backend-allocated identifier and return it.
    async fn add(&self, collection: &str, data: Record) -> Result<String>;

    /// Create or fully replace the document at `collection/document_id`.
    async fn set(&self, collection: &str, document_id: &str, data: Record) -> Result<()>;

    /// Read a document. `Ok(None)` means the document does not exist.
    async fn get(&self, collection: &str, document_id: &str) -> Result<Option<Record>>;

    /// Merge `data` into an existing document. Fails if it does not exist.
    async fn update(&self, collection: &str, document_id: &str, data: Record) -> Result<()>;

    async fn delete(&self, collection: &str, document_id: &str) -> Result<()>;
}
