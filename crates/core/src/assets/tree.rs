//! Parent validation for the asset forest.
//!
//! Stored rows are never trusted to be acyclic: every parent change is
//! re-validated from scratch with a bounded walk up the `parent_id` chain.
//! The bound only guarantees termination on corrupted data; it is not a
//! product limit on folder nesting.

use super::model::{Asset, AssetKind};
use super::repository::AssetRepository;
use super::{AssetError, ParentRejection};
use crate::types::DbId;

/// Default maximum number of ancestor hops followed before giving up.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 50;

/// Read-only checks over the tree. Every method is a read-then-decide
/// sequence and is safe to retry after a transient repository failure.
pub struct TreeChecker<'a> {
    repo: &'a dyn AssetRepository,
    max_depth: usize,
}

impl<'a> TreeChecker<'a> {
    pub fn new(repo: &'a dyn AssetRepository, max_depth: usize) -> Self {
        Self { repo, max_depth }
    }

    /// Existence and kind check only, for brand-new nodes that cannot yet be
    /// anyone's ancestor.
    pub async fn check_parent(&self, candidate: Option<DbId>) -> Result<Option<DbId>, AssetError> {
        let Some(parent_id) = candidate else {
            return Ok(None);
        };
        self.load_folder(parent_id).await?;
        Ok(Some(parent_id))
    }

    /// Full validation of `candidate` as the new parent of `subject`.
    ///
    /// Refuses self-parenting, missing or non-folder parents, and any
    /// parent that has `subject` among its ancestors. Returns the parent id
    /// to write.
    pub async fn validate_parent(
        &self,
        candidate: Option<DbId>,
        subject: DbId,
    ) -> Result<Option<DbId>, AssetError> {
        let Some(parent_id) = candidate else {
            return Ok(None);
        };
        if parent_id == subject {
            return Err(ParentRejection::SelfReference.into());
        }

        let parent = self.load_folder(parent_id).await?;

        let mut next = parent.parent_id;
        let mut hops = 0;
        while let Some(ancestor_id) = next {
            if ancestor_id == subject {
                return Err(ParentRejection::Cycle {
                    subject,
                    parent: parent_id,
                }
                .into());
            }

            hops += 1;
            if hops > self.max_depth {
                tracing::warn!(
                    subject,
                    parent_id,
                    max_depth = self.max_depth,
                    "Ancestor walk exceeded depth bound",
                );
                return Err(ParentRejection::DepthExceeded {
                    max_depth: self.max_depth,
                }
                .into());
            }

            let ancestor = self
                .repo
                .get_by_id(ancestor_id)
                .await?
                .ok_or(ParentRejection::DanglingAncestor(ancestor_id))?;
            next = ancestor.parent_id;
        }

        Ok(Some(parent_id))
    }

    /// The chain from the root down to `id`, inclusive.
    pub async fn path_to(&self, id: DbId) -> Result<Vec<Asset>, AssetError> {
        let asset = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(AssetError::NotFound(id))?;

        let mut next = asset.parent_id;
        let mut chain = vec![asset];
        while let Some(ancestor_id) = next {
            if chain.len() > self.max_depth {
                return Err(ParentRejection::DepthExceeded {
                    max_depth: self.max_depth,
                }
                .into());
            }
            let ancestor = self
                .repo
                .get_by_id(ancestor_id)
                .await?
                .ok_or(ParentRejection::DanglingAncestor(ancestor_id))?;
            next = ancestor.parent_id;
            chain.push(ancestor);
        }

        chain.reverse();
        Ok(chain)
    }

    async fn load_folder(&self, id: DbId) -> Result<Asset, AssetError> {
        let asset = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or(ParentRejection::Missing(id))?;
        if asset.kind != AssetKind::Folder {
            return Err(ParentRejection::NotAFolder(id).into());
        }
        Ok(asset)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
