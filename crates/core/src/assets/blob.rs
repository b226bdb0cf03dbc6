//! Blob backend interface consumed by the asset service.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Opaque reference (URL or key) returned by [`BlobStore::put`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(String);

impl BlobRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a blob deletion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobDeletion {
    Deleted,
    /// The blob was already gone. Callers treat this as success.
    NotFound,
}

/// Physical file backend.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` and return a reference to them. `suggested_name` is a
    /// hint for the key; uniqueness is the backend's job.
    async fn put(
        &self,
        bytes: Vec<u8>,
        suggested_name: &str,
        content_type: Option<&str>,
    ) -> Result<BlobRef, StoreError>;

    /// Remove the blob behind `blob`.
    async fn delete(&self, blob: &BlobRef) -> Result<BlobDeletion, StoreError>;

    /// Whether `reference` points into this backend's managed namespace.
    /// External URLs stored on assets are never deleted.
    fn owns(&self, reference: &str) -> bool;
}
