//! Blob storage for uploaded files
//!
//! Production uses an S3-compatible bucket; tests and local runs can use the
//! in-memory backend.

mod memory;
mod s3_client;

pub use memory::MemoryBlobStore;
pub use s3_client::S3Client;

use async_trait::async_trait;

use crate::error::StorageError;

/// Trait for blob storage backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object under `key`, replacing any existing object
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Delete a set of objects. Missing keys are not an error.
    async fn delete_objects(&self, keys: &[String]) -> Result<usize, StorageError>;
}
