//! S3-compatible storage client
//!
//! Wraps the AWS SDK for S3-compatible storage access.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    types::{Delete, ObjectIdentifier},
    Client,
};

use super::BlobStore;
use crate::config::StorageConfig;
use crate::error::StorageError;

/// DeleteObjects accepts at most this many keys per request
const DELETE_BATCH_SIZE: usize = 1000;

/// Objects removed by a batch, given how many the backend reported as failed
///
/// Some S3-compatible backends report more errors than keys sent.
fn deleted_count(requested: usize, failed: usize) -> usize {
    requested.saturating_sub(failed)
}

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from configuration
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "scrawl",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO and other S3-compatible services
            .build();

        let client = Client::from_conf(s3_config);

        // Test connection by checking if bucket exists
        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    e
                );
            }
        }

        Ok(Self { client, bucket })
    }

    async fn delete_batch(&self, keys: &[String]) -> Result<usize, StorageError> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::SdkError(format!("Invalid object key: {}", e)))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| StorageError::SdkError(format!("Invalid delete request: {}", e)))?;

        let response = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to delete objects: {}", e)))?;

        let errors = response.errors();
        for error in errors {
            tracing::warn!(
                key = error.key().unwrap_or_default(),
                code = error.code().unwrap_or_default(),
                "Object could not be deleted"
            );
        }

        Ok(deleted_count(keys.len(), errors.len()))
    }
}

#[async_trait]
impl BlobStore for S3Client {
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to put object {}: {}", key, e)))?;

        Ok(())
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<usize, StorageError> {
        let mut deleted = 0;
        for batch in keys.chunks(DELETE_BATCH_SIZE) {
            deleted += self.delete_batch(batch).await?;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_count_never_underflows() {
        assert_eq!(deleted_count(10, 0), 10);
        assert_eq!(deleted_count(10, 3), 7);
        assert_eq!(deleted_count(2, 5), 0);
    }
}
