//! Subtree traversal collecting the blobs a deletion will orphan.
//!
//! The result is a snapshot. Reparenting inside the subtree between the
//! snapshot and the row delete is not guarded against; see the delete
//! contract on [`super::service::AssetService::delete`].

use std::collections::HashSet;

use super::blob::{BlobRef, BlobStore};
use super::model::{AssetKind, AssetNode};
use super::repository::AssetRepository;
use super::AssetError;
use crate::types::DbId;

/// Walks a subtree depth-first with an explicit stack.
pub struct CascadeCollector<'a> {
    repo: &'a dyn AssetRepository,
    blobs: &'a dyn BlobStore,
}

impl<'a> CascadeCollector<'a> {
    pub fn new(repo: &'a dyn AssetRepository, blobs: &'a dyn BlobStore) -> Self {
        Self { repo, blobs }
    }

    /// Collect every managed blob reference owned by the subtree rooted at
    /// `root_id`, the root included.
    pub async fn collect(&self, root_id: DbId) -> Result<Vec<BlobRef>, AssetError> {
        let root = self
            .repo
            .get_by_id(root_id)
            .await?
            .ok_or(AssetError::NotFound(root_id))?;
        self.collect_from(AssetNode::from(&root)).await
    }

    /// Same as [`Self::collect`] for an already-loaded root.
    ///
    /// Each node is visited once even if corrupted rows form a cycle. Only
    /// folders are expanded. A file's `content_ref` and any node's
    /// `preview_ref` are collected when the blob store owns them;
    /// references are deduplicated, in visit order.
    pub async fn collect_from(&self, root: AssetNode) -> Result<Vec<BlobRef>, AssetError> {
        let mut refs = Vec::new();
        let mut seen_refs = HashSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if !visited.insert(node.id) {
                continue;
            }

            let content = match node.kind {
                AssetKind::File => node.content_ref.as_deref(),
                AssetKind::Folder => None,
            };
            for reference in content.into_iter().chain(node.preview_ref.as_deref()) {
                if self.blobs.owns(reference) && seen_refs.insert(reference.to_string()) {
                    refs.push(BlobRef::new(reference));
                }
            }

            if node.kind == AssetKind::Folder {
                let children = self.repo.find_children(node.id).await?;
                stack.extend(children.into_iter().filter(|c| !visited.contains(&c.id)));
            }
        }

        tracing::debug!(blob_count = refs.len(), nodes = visited.len(), "Collected subtree blobs");
        Ok(refs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
