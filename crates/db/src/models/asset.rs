//! Asset tree rows.

use depot_core::assets::model::{Asset, AssetKind, AssetNode, MediaKind};
use depot_core::assets::AssetError;
use depot_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `assets` table.
#[derive(Debug, Clone, FromRow)]
pub struct AssetRow {
    pub id: DbId,
    pub kind: String,
    pub name: String,
    pub parent_id: Option<DbId>,
    pub content_ref: Option<String>,
    pub preview_ref: Option<String>,
    pub media_kind: Option<String>,
    pub mime_type: Option<String>,
    pub extension: Option<String>,
    pub size_bytes: Option<i64>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Projection used when walking children.
#[derive(Debug, Clone, FromRow)]
pub struct AssetNodeRow {
    pub id: DbId,
    pub kind: String,
    pub content_ref: Option<String>,
    pub preview_ref: Option<String>,
}

impl TryFrom<AssetRow> for Asset {
    type Error = AssetError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        Ok(Asset {
            id: row.id,
            kind: AssetKind::from_name(&row.kind)?,
            name: row.name,
            parent_id: row.parent_id,
            content_ref: row.content_ref,
            preview_ref: row.preview_ref,
            media_kind: row
                .media_kind
                .as_deref()
                .map(MediaKind::from_name)
                .transpose()?,
            mime_type: row.mime_type,
            extension: row.extension,
            size_bytes: row.size_bytes,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<AssetNodeRow> for AssetNode {
    type Error = AssetError;

    fn try_from(row: AssetNodeRow) -> Result<Self, Self::Error> {
        Ok(AssetNode {
            id: row.id,
            kind: AssetKind::from_name(&row.kind)?,
            content_ref: row.content_ref,
            preview_ref: row.preview_ref,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(kind: &str, media_kind: Option<&str>) -> AssetRow {
        AssetRow {
            id: 1,
            kind: kind.to_string(),
            name: "a".to_string(),
            parent_id: None,
            content_ref: None,
            preview_ref: None,
            media_kind: media_kind.map(str::to_string),
            mime_type: None,
            extension: None,
            size_bytes: None,
            metadata: serde_json::json!({}),
            created_at: Timestamp::default(),
            updated_at: Timestamp::default(),
        }
    }

    #[test]
    fn converts_known_kinds() {
        let asset = Asset::try_from(row("file", Some("image"))).unwrap();
        assert_eq!(asset.kind, AssetKind::File);
        assert_eq!(asset.media_kind, Some(MediaKind::Image));

        let asset = Asset::try_from(row("folder", None)).unwrap();
        assert_eq!(asset.kind, AssetKind::Folder);
        assert_eq!(asset.media_kind, None);
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(Asset::try_from(row("symlink", None)).is_err());
        assert!(Asset::try_from(row("file", Some("video"))).is_err());
    }
}
