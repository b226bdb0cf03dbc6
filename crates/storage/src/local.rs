//! Blob store backed by a local directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use depot_core::assets::blob::{BlobDeletion, BlobRef, BlobStore};
use depot_core::error::StoreError;

use crate::keys::{is_valid_key, object_key};

/// Writes each blob to `{root}/{key}` and hands out `{public_base_url}/{key}`
/// as its reference. The directory layout is flat.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The key behind a managed reference, if it is one.
    fn key_of<'r>(&self, reference: &'r str) -> Option<&'r str> {
        reference
            .strip_prefix(self.public_base_url.as_str())?
            .strip_prefix('/')
            .filter(|key| is_valid_key(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        bytes: Vec<u8>,
        suggested_name: &str,
        _content_type: Option<&str>,
    ) -> Result<BlobRef, StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(StoreError::blob)?;

        let key = object_key(suggested_name);
        let path = self.root.join(&key);
        let size = bytes.len();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(StoreError::blob)?;

        tracing::debug!(path = %path.display(), size, "Blob written");
        Ok(BlobRef::new(format!("{}/{key}", self.public_base_url)))
    }

    async fn delete(&self, blob: &BlobRef) -> Result<BlobDeletion, StoreError> {
        let key = self.key_of(blob.as_str()).ok_or_else(|| {
            StoreError::blob(format!("'{blob}' is not managed by this blob store"))
        })?;

        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(BlobDeletion::Deleted),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BlobDeletion::NotFound),
            Err(e) => Err(StoreError::blob(e)),
        }
    }

    fn owns(&self, reference: &str) -> bool {
        self.key_of(reference).is_some()
    }
}
