//! Row-store interface consumed by the asset service.
//!
//! Implemented by `depot_db::PgAssetRepository` for PostgreSQL and by
//! [`super::memory::InMemoryAssetRepo`] for tests.

use async_trait::async_trait;

use super::model::{Asset, AssetFilter, AssetKind, AssetNode, AssetPatch, NewAsset};
use crate::error::StoreError;
use crate::types::DbId;

/// Persisted asset rows keyed by id, linked by `parent_id`.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Fetch one asset, `None` if it does not exist.
    async fn get_by_id(&self, id: DbId) -> Result<Option<Asset>, StoreError>;

    /// Direct children of a folder, as the minimal projection the cascade
    /// walk needs.
    async fn find_children(&self, parent_id: DbId) -> Result<Vec<AssetNode>, StoreError>;

    /// A sibling of the given kind whose name matches case-insensitively,
    /// ignoring `exclude_id`.
    async fn find_sibling(
        &self,
        parent_id: Option<DbId>,
        kind: AssetKind,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<Asset>, StoreError>;

    /// Any asset other than `exclude_id` whose `content_ref` or
    /// `preview_ref` equals `reference`.
    async fn find_by_blob_ref(
        &self,
        reference: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<Asset>, StoreError>;

    /// Insert a row, assigning its id and timestamps.
    async fn insert(&self, input: &NewAsset) -> Result<Asset, StoreError>;

    /// Apply a partial update, `None` if the row does not exist.
    async fn update(&self, id: DbId, patch: &AssetPatch) -> Result<Option<Asset>, StoreError>;

    /// Delete a row together with every descendant row. Returns `true` if
    /// the root row existed.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    /// Filtered listing: folders first, then case-insensitive name, then id.
    async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>, StoreError>;
}
