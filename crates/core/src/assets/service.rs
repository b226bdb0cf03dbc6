//! Asset operations: create, update, list, delete.
//!
//! The row store is the source of truth. Blob writes happen before the row
//! that references them is inserted; blob releases happen after the rows
//! that referenced them are gone. A failure between the two stores can
//! leave an orphaned blob, never a row pointing at a blob that was not
//! written.

use std::sync::Arc;

use serde::Serialize;

use super::blob::{BlobDeletion, BlobRef, BlobStore};
use super::cascade::CascadeCollector;
use super::media::{classify, extension_of};
use super::model::{
    Asset, AssetFilter, AssetKind, AssetNode, AssetPatch, CreateAsset, CreateFolder, FileUpload,
    NewAsset,
};
use super::naming::{ensure_unique, normalize_name};
use super::repository::AssetRepository;
use super::tree::{TreeChecker, DEFAULT_MAX_TREE_DEPTH};
use super::AssetError;
use crate::types::DbId;

/// Tunables for [`AssetService`].
#[derive(Debug, Clone, Copy)]
pub struct AssetServiceConfig {
    /// Bound on ancestor walks; see [`super::tree`].
    pub max_tree_depth: usize,
}

impl Default for AssetServiceConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }
}

/// Per-file result of a batch upload.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    Created {
        asset: Asset,
    },
    Failed {
        file_name: String,
        code: &'static str,
        error: String,
    },
}

/// What a cascading delete released.
#[derive(Debug, Clone, Serialize)]
pub struct DeletionSummary {
    pub asset_id: DbId,
    /// Blobs removed, or already absent from the store.
    pub released_blobs: Vec<BlobRef>,
    /// Blobs whose removal failed. They are orphaned until swept.
    pub failed_blobs: Vec<BlobRef>,
}

/// Orchestrates the tree checks over a row store and a blob store.
#[derive(Clone)]
pub struct AssetService {
    repo: Arc<dyn AssetRepository>,
    blobs: Arc<dyn BlobStore>,
    config: AssetServiceConfig,
}

impl AssetService {
    pub fn new(
        repo: Arc<dyn AssetRepository>,
        blobs: Arc<dyn BlobStore>,
        config: AssetServiceConfig,
    ) -> Self {
        Self {
            repo,
            blobs,
            config,
        }
    }

    fn tree(&self) -> TreeChecker<'_> {
        TreeChecker::new(self.repo.as_ref(), self.config.max_tree_depth)
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Create one asset.
    ///
    /// Folders must not carry content; files must. The parent must be an
    /// existing folder and the name must be free among same-kind siblings.
    /// Content is written to the blob store first and the row is only
    /// inserted once that write succeeded.
    pub async fn create(&self, input: CreateAsset) -> Result<Asset, AssetError> {
        let raw_name = match (&input.name, &input.content) {
            (Some(name), _) => name.as_str(),
            (None, Some(upload)) => upload.file_name.as_str(),
            (None, None) => {
                return Err(AssetError::Validation("Name is required".into()));
            }
        };
        let name = normalize_name(raw_name)?;

        match (input.kind, &input.content) {
            (AssetKind::Folder, Some(_)) => {
                return Err(AssetError::Validation(
                    "Folders cannot carry file content".into(),
                ));
            }
            (AssetKind::File, None) => {
                return Err(AssetError::Validation("File content is required".into()));
            }
            _ => {}
        }

        let parent_id = self.tree().check_parent(input.parent_id).await?;
        ensure_unique(self.repo.as_ref(), &name, parent_id, input.kind, None).await?;
        if let Some(preview_ref) = &input.preview_ref {
            self.ensure_blob_unclaimed(preview_ref, None).await?;
        }

        let mut row = NewAsset {
            kind: input.kind,
            name,
            parent_id,
            content_ref: None,
            preview_ref: input.preview_ref,
            media_kind: None,
            mime_type: None,
            extension: None,
            size_bytes: None,
            metadata: input.metadata.unwrap_or_else(|| serde_json::json!({})),
        };

        let Some(upload) = input.content else {
            let asset = self.repo.insert(&row).await?;
            tracing::info!(asset_id = asset.id, parent_id = ?asset.parent_id, kind = %asset.kind, "Asset created");
            return Ok(asset);
        };

        let extension = extension_of(&upload.file_name);
        let mime_type = upload.mime_type.filter(|m| !m.trim().is_empty());
        row.media_kind = Some(classify(extension.as_deref(), mime_type.as_deref()));
        row.size_bytes = Some(upload.bytes.len() as i64);

        let blob = self
            .blobs
            .put(upload.bytes, &row.name, mime_type.as_deref())
            .await?;
        row.content_ref = Some(blob.as_str().to_string());
        row.extension = extension;
        row.mime_type = mime_type;

        match self.repo.insert(&row).await {
            Ok(asset) => {
                tracing::info!(
                    asset_id = asset.id,
                    parent_id = ?asset.parent_id,
                    kind = %asset.kind,
                    blob_ref = %blob,
                    "Asset created",
                );
                Ok(asset)
            }
            Err(err) => {
                self.release_unreferenced(&blob).await;
                Err(err.into())
            }
        }
    }

    /// Create a folder with an explicit name.
    pub async fn create_folder(&self, input: CreateFolder) -> Result<Asset, AssetError> {
        self.create(input.into()).await
    }

    /// Create one file asset per upload under `parent_id`.
    ///
    /// The parent is validated once up front; an invalid parent fails the
    /// whole call before anything is written. After that each file stands
    /// alone: a failure is reported in its own outcome and does not roll
    /// back siblings created earlier in the batch.
    pub async fn upload_files(
        &self,
        parent_id: Option<DbId>,
        uploads: Vec<FileUpload>,
    ) -> Result<Vec<UploadOutcome>, AssetError> {
        if uploads.is_empty() {
            return Err(AssetError::Validation("No files were uploaded".into()));
        }
        let parent_id = self.tree().check_parent(parent_id).await?;

        let mut outcomes = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let file_name = upload.file_name.clone();
            let request = CreateAsset {
                parent_id,
                kind: AssetKind::File,
                name: None,
                content: Some(upload),
                preview_ref: None,
                metadata: None,
            };
            match self.create(request).await {
                Ok(asset) => outcomes.push(UploadOutcome::Created { asset }),
                Err(err) => {
                    tracing::warn!(file_name = %file_name, error = %err, "Upload item failed");
                    outcomes.push(UploadOutcome::Failed {
                        file_name,
                        code: err.code(),
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(outcomes)
    }

    // -----------------------------------------------------------------------
    // Read
    // -----------------------------------------------------------------------

    pub async fn get(&self, id: DbId) -> Result<Asset, AssetError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(AssetError::NotFound(id))
    }

    /// Breadcrumb from the root down to `id`.
    pub async fn path(&self, id: DbId) -> Result<Vec<Asset>, AssetError> {
        self.tree().path_to(id).await
    }

    /// Children of `filter.parent_id` (roots when `None`), folders first,
    /// then alphabetical ignoring case.
    pub async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>, AssetError> {
        let filter = AssetFilter {
            name_contains: filter
                .name_contains
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            ..filter.clone()
        };
        Ok(self.repo.list(&filter).await?)
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Apply a partial update.
    ///
    /// A present `parent_id` (including `null`) goes through full parent
    /// validation. Renames and moves are checked for sibling conflicts at
    /// the destination, the asset itself excluded. On any rejection the
    /// asset is left unchanged.
    pub async fn update(&self, id: DbId, mut patch: AssetPatch) -> Result<Asset, AssetError> {
        let current = self.get(id).await?;

        if let Some(name) = patch.name.take() {
            patch.name = Some(normalize_name(&name)?);
        }
        if current.kind == AssetKind::Folder && patch.content_ref.is_some() {
            return Err(AssetError::Validation(
                "Folders cannot carry file content".into(),
            ));
        }
        if patch.size_bytes.is_some_and(|size| size < 0) {
            return Err(AssetError::Validation(
                "size_bytes must not be negative".into(),
            ));
        }
        for reference in [&patch.content_ref, &patch.preview_ref].into_iter().flatten() {
            self.ensure_blob_unclaimed(reference, Some(id)).await?;
        }

        let target_parent = match patch.parent_id {
            Some(candidate) => self.tree().validate_parent(candidate, id).await?,
            None => current.parent_id,
        };
        let target_name = patch.name.as_deref().unwrap_or(&current.name);

        let renamed = target_name != current.name;
        let moved = target_parent != current.parent_id;
        if renamed || moved {
            ensure_unique(
                self.repo.as_ref(),
                target_name,
                target_parent,
                current.kind,
                Some(id),
            )
            .await?;
        }

        let asset = self
            .repo
            .update(id, &patch)
            .await?
            .ok_or(AssetError::NotFound(id))?;

        tracing::info!(
            asset_id = id,
            parent_id = ?asset.parent_id,
            renamed,
            moved,
            "Asset updated",
        );
        Ok(asset)
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Delete an asset and its whole subtree, then release their blobs.
    ///
    /// Order: snapshot the subtree's blob references, delete the root row
    /// (descendant rows go with it), then delete each blob. A blob already
    /// missing counts as released. Any other blob failure is logged and
    /// reported in the summary without failing the call, since the rows are
    /// already gone.
    ///
    /// Not guarded against concurrent reparenting: a node moved out of the
    /// subtree after the snapshot loses its blob, and a node moved in is
    /// deleted with its blob left orphaned.
    pub async fn delete(&self, id: DbId) -> Result<DeletionSummary, AssetError> {
        let root = self.get(id).await?;

        let refs = CascadeCollector::new(self.repo.as_ref(), self.blobs.as_ref())
            .collect_from(AssetNode::from(&root))
            .await?;

        if !self.repo.delete(id).await? {
            return Err(AssetError::NotFound(id));
        }
        tracing::info!(asset_id = id, kind = %root.kind, blob_count = refs.len(), "Asset subtree deleted");

        let mut summary = DeletionSummary {
            asset_id: id,
            released_blobs: Vec::with_capacity(refs.len()),
            failed_blobs: Vec::new(),
        };
        for blob in refs {
            match self.blobs.delete(&blob).await {
                Ok(BlobDeletion::Deleted) => summary.released_blobs.push(blob),
                Ok(BlobDeletion::NotFound) => {
                    tracing::debug!(asset_id = id, blob_ref = %blob, "Blob already absent");
                    summary.released_blobs.push(blob);
                }
                Err(err) => {
                    tracing::warn!(
                        asset_id = id,
                        blob_ref = %blob,
                        error = %err,
                        "Blob cleanup failed; blob is orphaned",
                    );
                    summary.failed_blobs.push(blob);
                }
            }
        }

        Ok(summary)
    }

    /// A managed blob belongs to exactly one asset: refuse to attach one
    /// that another asset already references. Unmanaged references are
    /// never released, so they may be shared.
    async fn ensure_blob_unclaimed(
        &self,
        reference: &str,
        exclude_id: Option<DbId>,
    ) -> Result<(), AssetError> {
        if !self.blobs.owns(reference) {
            return Ok(());
        }
        if let Some(owner) = self.repo.find_by_blob_ref(reference, exclude_id).await? {
            return Err(AssetError::Validation(format!(
                "Blob '{reference}' already belongs to asset #{}",
                owner.id
            )));
        }
        Ok(())
    }

    /// Best-effort removal of a blob whose row insert failed.
    async fn release_unreferenced(&self, blob: &BlobRef) {
        if let Err(err) = self.blobs.delete(blob).await {
            tracing::warn!(blob_ref = %blob, error = %err, "Failed to release blob after insert failure");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
