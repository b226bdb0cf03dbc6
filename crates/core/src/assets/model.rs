//! Asset tree models and DTOs.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::AssetError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Node kind. Declaration order is the listing order: folders sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Folder,
    File,
}

impl AssetKind {
    /// Parse from the database `kind` column.
    pub fn from_name(name: &str) -> Result<Self, AssetError> {
        match name {
            "folder" => Ok(Self::Folder),
            "file" => Ok(Self::File),
            other => Err(AssetError::Validation(format!(
                "Unknown asset kind '{other}'. Must be one of: folder, file"
            ))),
        }
    }

    /// Database name value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse content classification used for filtering in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Model,
    File,
}

impl MediaKind {
    /// Parse from the database `media_kind` column.
    pub fn from_name(name: &str) -> Result<Self, AssetError> {
        match name {
            "image" => Ok(Self::Image),
            "model" => Ok(Self::Model),
            "file" => Ok(Self::File),
            other => Err(AssetError::Validation(format!(
                "Unknown media kind '{other}'. Must be one of: image, model, file"
            ))),
        }
    }

    /// Database name value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Model => "model",
            Self::File => "file",
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A node in the asset tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: DbId,
    pub kind: AssetKind,
    pub name: String,
    /// Owning folder; `None` for roots.
    pub parent_id: Option<DbId>,
    /// Blob reference backing a file node.
    pub content_ref: Option<String>,
    /// Secondary blob reference for a thumbnail or preview.
    pub preview_ref: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub mime_type: Option<String>,
    pub extension: Option<String>,
    pub size_bytes: Option<i64>,
    /// Caller-owned attributes, never interpreted here.
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Minimal projection returned when walking children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetNode {
    pub id: DbId,
    pub kind: AssetKind,
    pub content_ref: Option<String>,
    pub preview_ref: Option<String>,
}

impl From<&Asset> for AssetNode {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id,
            kind: asset.kind,
            content_ref: asset.content_ref.clone(),
            preview_ref: asset.preview_ref.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Row to insert. Produced by the service after every check has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub kind: AssetKind,
    pub name: String,
    pub parent_id: Option<DbId>,
    pub content_ref: Option<String>,
    pub preview_ref: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub mime_type: Option<String>,
    pub extension: Option<String>,
    pub size_bytes: Option<i64>,
    pub metadata: serde_json::Value,
}

/// Partial update. Absent fields are left untouched.
///
/// `parent_id` distinguishes "absent" (`None`) from an explicit JSON `null`
/// (`Some(None)`, move to root).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssetPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub parent_id: Option<Option<DbId>>,
    pub preview_ref: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub content_ref: Option<String>,
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub extension: Option<String>,
    pub media_kind: Option<MediaKind>,
}

/// Listing filter. `parent_id: None` lists roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssetFilter {
    pub parent_id: Option<DbId>,
    pub kind: Option<AssetKind>,
    /// Case-insensitive substring match on `name`.
    #[serde(rename = "q")]
    pub name_contains: Option<String>,
}

/// Raw uploaded object.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Request to create a single asset.
///
/// When `name` is `None` a file takes the uploaded object's file name.
#[derive(Debug, Clone)]
pub struct CreateAsset {
    pub parent_id: Option<DbId>,
    pub kind: AssetKind,
    pub name: Option<String>,
    pub content: Option<FileUpload>,
    pub preview_ref: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// JSON body for explicit folder creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFolder {
    pub parent_id: Option<DbId>,
    pub name: String,
    pub metadata: Option<serde_json::Value>,
}

impl From<CreateFolder> for CreateAsset {
    fn from(input: CreateFolder) -> Self {
        Self {
            parent_id: input.parent_id,
            kind: AssetKind::Folder,
            name: Some(input.name),
            content: None,
            preview_ref: None,
            metadata: input.metadata,
        }
    }
}

/// Deserialize a field that may be absent, `null`, or a value.
///
/// Used with `#[serde(default)]`: absence yields `None`, `null` yields
/// `Some(None)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
