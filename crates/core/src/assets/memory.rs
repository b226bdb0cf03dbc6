//! In-memory implementations of the repository and blob store.
//!
//! Used by unit tests here and by the API integration tests. Both types
//! expose knobs for simulating corrupted rows, out-of-band blob removal,
//! and backend failures.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::blob::{BlobDeletion, BlobRef, BlobStore};
use super::model::{Asset, AssetFilter, AssetKind, AssetNode, AssetPatch, NewAsset};
use super::repository::AssetRepository;
use crate::error::StoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RepoState {
    rows: BTreeMap<DbId, Asset>,
    next_id: DbId,
}

/// Row store backed by a `BTreeMap`. Deleting a row removes its whole
/// subtree, like `ON DELETE CASCADE` on `parent_id`.
#[derive(Default)]
pub struct InMemoryAssetRepo {
    state: Mutex<RepoState>,
    fail_inserts: AtomicBool,
}

impl InMemoryAssetRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a row's `parent_id` with no checks at all, to simulate
    /// corrupted data.
    pub async fn force_parent(&self, id: DbId, parent_id: Option<DbId>) {
        let mut state = self.state.lock().await;
        if let Some(row) = state.rows.get_mut(&id) {
            row.parent_id = parent_id;
        }
    }

    /// Make every subsequent `insert` fail with a repository error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.state.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssetRepo {
    async fn get_by_id(&self, id: DbId) -> Result<Option<Asset>, StoreError> {
        Ok(self.state.lock().await.rows.get(&id).cloned())
    }

    async fn find_children(&self, parent_id: DbId) -> Result<Vec<AssetNode>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .rows
            .values()
            .filter(|row| row.parent_id == Some(parent_id))
            .map(AssetNode::from)
            .collect())
    }

    async fn find_sibling(
        &self,
        parent_id: Option<DbId>,
        kind: AssetKind,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<Asset>, StoreError> {
        let needle = name.to_lowercase();
        let state = self.state.lock().await;
        Ok(state
            .rows
            .values()
            .find(|row| {
                row.parent_id == parent_id
                    && row.kind == kind
                    && Some(row.id) != exclude_id
                    && row.name.to_lowercase() == needle
            })
            .cloned())
    }

    async fn find_by_blob_ref(
        &self,
        reference: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<Asset>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .rows
            .values()
            .find(|row| {
                Some(row.id) != exclude_id
                    && (row.content_ref.as_deref() == Some(reference)
                        || row.preview_ref.as_deref() == Some(reference))
            })
            .cloned())
    }

    async fn insert(&self, input: &NewAsset) -> Result<Asset, StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::repository("insert rejected"));
        }

        let mut state = self.state.lock().await;
        if let Some(parent_id) = input.parent_id {
            if !state.rows.contains_key(&parent_id) {
                return Err(StoreError::repository(format!(
                    "foreign key violation: parent #{parent_id} does not exist"
                )));
            }
        }

        state.next_id += 1;
        let now = Utc::now();
        let asset = Asset {
            id: state.next_id,
            kind: input.kind,
            name: input.name.clone(),
            parent_id: input.parent_id,
            content_ref: input.content_ref.clone(),
            preview_ref: input.preview_ref.clone(),
            media_kind: input.media_kind,
            mime_type: input.mime_type.clone(),
            extension: input.extension.clone(),
            size_bytes: input.size_bytes,
            metadata: input.metadata.clone(),
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(asset.id, asset.clone());
        Ok(asset)
    }

    async fn update(&self, id: DbId, patch: &AssetPatch) -> Result<Option<Asset>, StoreError> {
        let mut state = self.state.lock().await;
        let Some(row) = state.rows.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            row.name = name.clone();
        }
        if let Some(parent_id) = patch.parent_id {
            row.parent_id = parent_id;
        }
        if let Some(preview_ref) = &patch.preview_ref {
            row.preview_ref = Some(preview_ref.clone());
        }
        if let Some(metadata) = &patch.metadata {
            row.metadata = metadata.clone();
        }
        if let Some(content_ref) = &patch.content_ref {
            row.content_ref = Some(content_ref.clone());
        }
        if let Some(mime_type) = &patch.mime_type {
            row.mime_type = Some(mime_type.clone());
        }
        if let Some(size_bytes) = patch.size_bytes {
            row.size_bytes = Some(size_bytes);
        }
        if let Some(extension) = &patch.extension {
            row.extension = Some(extension.clone());
        }
        if let Some(media_kind) = patch.media_kind {
            row.media_kind = Some(media_kind);
        }
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        if !state.rows.contains_key(&id) {
            return Ok(false);
        }

        let mut doomed = HashSet::from([id]);
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for row in state.rows.values() {
                if row.parent_id == Some(current) && doomed.insert(row.id) {
                    frontier.push(row.id);
                }
            }
        }

        state.rows.retain(|row_id, _| !doomed.contains(row_id));
        Ok(true)
    }

    async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>, StoreError> {
        let needle = filter.name_contains.as_ref().map(|s| s.to_lowercase());
        let state = self.state.lock().await;

        let mut rows: Vec<Asset> = state
            .rows
            .values()
            .filter(|row| row.parent_id == filter.parent_id)
            .filter(|row| filter.kind.is_none_or(|kind| row.kind == kind))
            .filter(|row| {
                needle
                    .as_ref()
                    .is_none_or(|needle| row.name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();

        rows.sort_by_key(|row| (row.kind, row.name.to_lowercase(), row.id));
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Blob store
// ---------------------------------------------------------------------------

/// URL scheme used for references issued by [`InMemoryBlobStore`].
pub const MEMORY_BLOB_PREFIX: &str = "mem://";

/// Blob store backed by a `HashMap`.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    failing_deletes: Mutex<HashSet<String>>,
    fail_puts: AtomicBool,
    counter: AtomicU64,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the blob behind `reference` is still stored.
    pub async fn contains(&self, reference: &str) -> bool {
        self.blobs.lock().await.contains_key(reference)
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop a blob behind the service's back.
    pub async fn remove_out_of_band(&self, reference: &str) {
        self.blobs.lock().await.remove(reference);
    }

    /// Make every subsequent `put` fail.
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make deletion of one specific reference fail.
    pub async fn fail_delete_of(&self, reference: &str) {
        self.failing_deletes
            .lock()
            .await
            .insert(reference.to_string());
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(
        &self,
        bytes: Vec<u8>,
        suggested_name: &str,
        _content_type: Option<&str>,
    ) -> Result<BlobRef, StoreError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::blob("write rejected"));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = format!("{MEMORY_BLOB_PREFIX}{n}/{suggested_name}");
        self.blobs.lock().await.insert(reference.clone(), bytes);
        Ok(BlobRef::new(reference))
    }

    async fn delete(&self, blob: &BlobRef) -> Result<BlobDeletion, StoreError> {
        if self.failing_deletes.lock().await.contains(blob.as_str()) {
            return Err(StoreError::blob(format!("delete of {blob} rejected")));
        }

        match self.blobs.lock().await.remove(blob.as_str()) {
            Some(_) => Ok(BlobDeletion::Deleted),
            None => Ok(BlobDeletion::NotFound),
        }
    }

    fn owns(&self, reference: &str) -> bool {
        reference.starts_with(MEMORY_BLOB_PREFIX)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
