//! In-memory blob store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BlobStore;
use crate::error::StorageError;

#[derive(Debug, Clone)]
struct StoredBlob {
    data: Vec<u8>,
    content_type: String,
}

/// Blob store that keeps objects in process memory
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, StoredBlob>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Stored keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Fetch an object's bytes and content type
    pub async fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|blob| (blob.data.clone(), blob.content_type.clone()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut objects = self.objects.write().await;
        objects.insert(
            key.to_string(),
            StoredBlob {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<usize, StorageError> {
        let mut objects = self.objects.write().await;
        Ok(keys.iter().filter(|key| objects.remove(*key).is_some()).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_delete() {
        let store = MemoryBlobStore::new();

        store.put_object("a/1-x.png", b"png".to_vec(), "image/png").await.unwrap();
        store.put_object("a/2-y.pdf", b"pdf".to_vec(), "application/pdf").await.unwrap();
        assert_eq!(store.len().await, 2);

        let (data, content_type) = store.get("a/1-x.png").await.unwrap();
        assert_eq!(data, b"png");
        assert_eq!(content_type, "image/png");

        let deleted = store
            .delete_objects(&["a/1-x.png".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.keys().await, vec!["a/2-y.pdf".to_string()]);
    }
}
