//! Blob backends for asset content.
//!
//! Two implementations of [`depot_core::assets::blob::BlobStore`]:
//! [`LocalBlobStore`] (files under a directory, served from a URL prefix)
//! and [`S3BlobStore`]. [`connect`] picks one from [`BlobBackendConfig`].

use std::sync::Arc;

use depot_core::assets::blob::BlobStore;

pub mod config;
pub mod keys;
pub mod local;
pub mod s3;

pub use config::BlobBackendConfig;
pub use local::LocalBlobStore;
pub use s3::S3BlobStore;

/// Build the configured blob backend.
pub async fn connect(config: &BlobBackendConfig) -> Arc<dyn BlobStore> {
    match config {
        BlobBackendConfig::Local {
            root,
            public_base_url,
        } => {
            tracing::info!(root = %root.display(), public_base_url, "Using local blob storage");
            Arc::new(LocalBlobStore::new(root.clone(), public_base_url.clone()))
        }
        BlobBackendConfig::S3 {
            bucket,
            prefix,
            public_base_url,
        } => {
            tracing::info!(bucket, prefix, public_base_url, "Using S3 blob storage");
            Arc::new(
                S3BlobStore::from_env(bucket.clone(), prefix.clone(), public_base_url.clone())
                    .await,
            )
        }
    }
}
