//! Blob store backed by an S3 bucket.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use depot_core::assets::blob::{BlobDeletion, BlobRef, BlobStore};
use depot_core::error::StoreError;

use crate::keys::{is_valid_key, object_key};

/// Stores each blob as `{prefix}/{key}` in `bucket` and hands out
/// `{public_base_url}/{prefix}/{key}` as its reference.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    prefix: String,
    public_base_url: String,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: String, prefix: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            prefix: prefix.trim_matches('/').to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from the standard AWS environment (credentials,
    /// region, endpoint overrides).
    pub async fn from_env(bucket: String, prefix: String, public_base_url: String) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(Client::new(&sdk_config), bucket, prefix, public_base_url)
    }

    fn object_path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{key}", self.prefix)
        }
    }

    /// The full object path behind a managed reference, if it is one.
    fn object_path_of(&self, reference: &str) -> Option<String> {
        let rest = reference
            .strip_prefix(self.public_base_url.as_str())?
            .strip_prefix('/')?;
        let key = if self.prefix.is_empty() {
            rest
        } else {
            rest.strip_prefix(self.prefix.as_str())?.strip_prefix('/')?
        };
        is_valid_key(key).then(|| self.object_path(key))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        bytes: Vec<u8>,
        suggested_name: &str,
        content_type: Option<&str>,
    ) -> Result<BlobRef, StoreError> {
        let path = self.object_path(&object_key(suggested_name));
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&path)
            .set_content_type(content_type.map(str::to_string))
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StoreError::blob(e.into_service_error()))?;

        tracing::debug!(bucket = %self.bucket, key = %path, size, "Blob uploaded to S3");
        Ok(BlobRef::new(format!("{}/{path}", self.public_base_url)))
    }

    /// S3 deletes are idempotent, so a missing object reports `Deleted`.
    async fn delete(&self, blob: &BlobRef) -> Result<BlobDeletion, StoreError> {
        let path = self.object_path_of(blob.as_str()).ok_or_else(|| {
            StoreError::blob(format!("'{blob}' is not managed by this blob store"))
        })?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&path)
            .send()
            .await
            .map_err(|e| StoreError::blob(e.into_service_error()))?;

        tracing::debug!(bucket = %self.bucket, key = %path, "Blob deleted from S3");
        Ok(BlobDeletion::Deleted)
    }

    fn owns(&self, reference: &str) -> bool {
        self.object_path_of(reference).is_some()
    }
}
