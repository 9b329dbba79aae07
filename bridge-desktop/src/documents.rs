//! In-memory document store.

use async_trait::async_trait;
use bridge_traits::{
    document::DocumentBackend,
    error::{BridgeError, Result},
    record::Record,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

type Collection = HashMap<String, Record>;

/// Collections of documents keyed by id. Allocated ids are 20-character
/// alphanumeric strings.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, HashMap::len)
    }

    fn allocate_id() -> String {
        Uuid::new_v4().simple().to_string()[..20].to_string()
    }

    fn check_path(collection: &str, document_id: Option<&str>) -> Result<()> {
        if collection.is_empty() || collection.contains('/') {
            return Err(BridgeError::backend(format!(
                "Invalid collection reference '{}'",
                collection
            )));
        }
        if let Some(id) = document_id {
            if id.is_empty() || id.contains('/') {
                return Err(BridgeError::backend(format!(
                    "Invalid document reference '{}'",
                    id
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for InMemoryDocumentStore {
    async fn add(&self, collection: &str, data: Record) -> Result<String> {
        Self::check_path(collection, None)?;
        let id = Self::allocate_id();
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        debug!(collection, id = %id, "Added document");
        Ok(id)
    }

    async fn set(&self, collection: &str, document_id: &str, data: Record) -> Result<()> {
        Self::check_path(collection, Some(document_id))?;
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(document_id.to_string(), data);
        Ok(())
    }

    async fn get(&self, collection: &str, document_id: &str) -> Result<Option<Record>> {
        Self::check_path(collection, Some(document_id))?;
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|documents| documents.get(document_id))
            .cloned())
    }

    async fn update(&self, collection: &str, document_id: &str, data: Record) -> Result<()> {
        Self::check_path(collection, Some(document_id))?;
        let mut collections = self.collections.write();
        let document = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(document_id))
            .ok_or_else(|| {
                BridgeError::backend(format!(
                    "NOT_FOUND: No document to update: {}/{}",
                    collection, document_id
                ))
            })?;
        document.merge(data);
        Ok(())
    }

    /// Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, document_id: &str) -> Result<()> {
        Self::check_path(collection, Some(document_id))?;
        if let Some(documents) = self.collections.write().get_mut(collection) {
            documents.remove(document_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_allocates_distinct_ids() {
        let store = InMemoryDocumentStore::new();
        let first = store.add("scores", Record::new().with("points", 1_i64)).await.unwrap();
        let second = store.add("scores", Record::new().with("points", 2_i64)).await.unwrap();

        assert_eq!(first.len(), 20);
        assert_ne!(first, second);
        assert_eq!(store.document_count("scores"), 2);
    }

    #[tokio::test]
    async fn test_set_replaces_and_update_merges() {
        let store = InMemoryDocumentStore::new();
        store
            .set("players", "p1", Record::new().with("name", "Ada").with("level", 1_i64))
            .await
            .unwrap();
        store
            .set("players", "p1", Record::new().with("name", "Grace"))
            .await
            .unwrap();

        let doc = store.get("players", "p1").await.unwrap().unwrap();
        assert!(!doc.contains_key("level"));

        store
            .update("players", "p1", Record::new().with("level", 5_i64))
            .await
            .unwrap();
        let doc = store.get("players", "p1").await.unwrap().unwrap();
        assert_eq!(doc.get("name").and_then(|v| v.as_text()), Some("Grace"));
        assert_eq!(doc.get("level").and_then(|v| v.as_number()), Some(5.0));
    }

    #[tokio::test]
    async fn test_missing_documents() {
        let store = InMemoryDocumentStore::new();
        assert!(store.get("players", "ghost").await.unwrap().is_none());
        assert!(store.update("players", "ghost", Record::new()).await.is_err());
        store.delete("players", "ghost").await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_paths() {
        let store = InMemoryDocumentStore::new();
        assert!(store.add("", Record::new()).await.is_err());
        assert!(store.get("players", "a/b").await.is_err());
    }
}
