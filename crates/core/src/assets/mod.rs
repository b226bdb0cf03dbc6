//! Hierarchical asset store business logic.
//!
//! Folders and files form a forest of rows linked by `parent_id`. This
//! module validates every parent change against that forest, keeps sibling
//! names unique, and releases the blobs owned by a subtree when it is
//! deleted. It does NOT depend on the database crate; the row store and the
//! blob backend are reached through [`repository::AssetRepository`] and
//! [`blob::BlobStore`].

pub mod blob;
pub mod cascade;
pub mod media;
pub mod memory;
pub mod model;
pub mod naming;
pub mod repository;
pub mod service;
pub mod tree;

use crate::error::StoreError;
use crate::types::DbId;

/// Why a proposed `parent_id` was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParentRejection {
    #[error("an asset cannot be its own parent")]
    SelfReference,

    #[error("parent #{0} does not exist")]
    Missing(DbId),

    #[error("parent #{0} is not a folder")]
    NotAFolder(DbId),

    #[error("moving #{subject} under #{parent} would create a cycle")]
    Cycle { subject: DbId, parent: DbId },

    #[error("ancestor chain exceeds {max_depth} levels")]
    DepthExceeded { max_depth: usize },

    #[error("ancestor #{0} is missing from the tree")]
    DanglingAncestor(DbId),
}

/// Asset-domain error type.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Invalid parent: {0}")]
    InvalidParent(ParentRejection),

    #[error("Name conflict: a {kind} named '{name}' already exists in this folder")]
    NameConflict { name: String, kind: model::AssetKind },

    #[error("Asset not found: #{0}")]
    NotFound(DbId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl AssetError {
    /// Stable machine-readable code used in API payloads and batch reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParent(_) => "INVALID_PARENT",
            Self::NameConflict { .. } => "CONFLICT",
            Self::Storage(StoreError::UniqueViolation { .. }) => "CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Storage(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ParentRejection> for AssetError {
    fn from(reason: ParentRejection) -> Self {
        Self::InvalidParent(reason)
    }
}
