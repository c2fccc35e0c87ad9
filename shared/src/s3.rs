use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;
use std::time::Duration;

use crate::error::ApiError;

/// Object storage for profile images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Presigned PUT URL for `key`, bound to `content_type`
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, ApiError>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn delete_object(&self, key: &str) -> Result<(), ApiError>;
}

pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, ApiError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| ApiError::ObjectStore(format!("Invalid presign expiry: {}", e)))?;

        let presigned_request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| {
                tracing::error!("Failed to generate presigned URL for {}: {:?}", key, e);
                ApiError::ObjectStore(e.to_string())
            })?;

        Ok(presigned_request.uri().to_string())
    }

    async fn delete_object(&self, key: &str) -> Result<(), ApiError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete {} from S3: {:?}", key, e);
                ApiError::ObjectStore(e.to_string())
            })?;
        Ok(())
    }
}

/// Public URL an object will have once uploaded. Constructed, not checked.
pub fn public_object_url(bucket: &str, key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, key)
}
