//! Sibling name rules.
//!
//! Names are unique, case-insensitively, among assets sharing the same
//! parent and kind. A folder and a file may share a name.

use std::sync::LazyLock;

use regex::Regex;

use super::model::AssetKind;
use super::repository::AssetRepository;
use super::AssetError;
use crate::error::StoreError;
use crate::types::DbId;

/// Maximum name length in characters.
pub const MAX_NAME_CHARS: usize = 255;

/// Path separators and control characters are not allowed in names.
static FORBIDDEN_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\\x00-\x1f\x7f]").expect("valid regex"));

/// Trim and validate a display name.
pub fn normalize_name(raw: &str) -> Result<String, AssetError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AssetError::Validation("Name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AssetError::Validation(format!(
            "Name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    if name == "." || name == ".." {
        return Err(AssetError::Validation(format!("'{name}' is not a valid name")));
    }
    if FORBIDDEN_NAME_CHARS.is_match(name) {
        return Err(AssetError::Validation(
            "Name must not contain slashes or control characters".into(),
        ));
    }
    Ok(name.to_string())
}

/// Whether another asset of `kind` under `parent_id` already uses `name`,
/// ignoring case and the asset `exclude_id`.
pub async fn has_conflict(
    repo: &dyn AssetRepository,
    name: &str,
    parent_id: Option<DbId>,
    kind: AssetKind,
    exclude_id: Option<DbId>,
) -> Result<bool, StoreError> {
    Ok(repo
        .find_sibling(parent_id, kind, name, exclude_id)
        .await?
        .is_some())
}

/// [`has_conflict`] as a guard returning [`AssetError::NameConflict`].
pub async fn ensure_unique(
    repo: &dyn AssetRepository,
    name: &str,
    parent_id: Option<DbId>,
    kind: AssetKind,
    exclude_id: Option<DbId>,
) -> Result<(), AssetError> {
    if has_conflict(repo, name, parent_id, kind, exclude_id).await? {
        return Err(AssetError::NameConflict {
            name: name.to_string(),
            kind,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::assets::memory::InMemoryAssetRepo;
    use crate::assets::model::NewAsset;

    fn node(kind: AssetKind, name: &str, parent_id: Option<DbId>) -> NewAsset {
        NewAsset {
            kind,
            name: name.to_string(),
            parent_id,
            content_ref: None,
            preview_ref: None,
            media_kind: None,
            mime_type: None,
            extension: None,
            size_bytes: None,
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn normalize_trims() {
        assert_eq!(normalize_name("  Docs  ").unwrap(), "Docs");
    }

    #[test]
    fn normalize_rejects_bad_names() {
        for bad in ["", "   ", ".", "..", "a/b", "a\\b", "tab\there"] {
            assert_matches!(normalize_name(bad), Err(AssetError::Validation(_)), "{bad:?}");
        }
        assert!(normalize_name(&"x".repeat(MAX_NAME_CHARS + 1)).is_err());
        assert!(normalize_name(&"x".repeat(MAX_NAME_CHARS)).is_ok());
    }

    #[tokio::test]
    async fn conflict_is_case_insensitive() {
        let repo = InMemoryAssetRepo::new();
        repo.insert(&node(AssetKind::Folder, "Docs", None))
            .await
            .unwrap();

        assert!(has_conflict(&repo, "docs", None, AssetKind::Folder, None)
            .await
            .unwrap());
        assert!(has_conflict(&repo, "DOCS", None, AssetKind::Folder, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn conflict_is_scoped_to_parent_and_kind() {
        let repo = InMemoryAssetRepo::new();
        let root = repo
            .insert(&node(AssetKind::Folder, "root", None))
            .await
            .unwrap();
        repo.insert(&node(AssetKind::Folder, "Docs", Some(root.id)))
            .await
            .unwrap();

        assert!(!has_conflict(&repo, "docs", None, AssetKind::Folder, None)
            .await
            .unwrap());
        assert!(!has_conflict(&repo, "docs", Some(root.id), AssetKind::File, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn excluded_asset_does_not_conflict_with_itself() {
        let repo = InMemoryAssetRepo::new();
        let docs = repo
            .insert(&node(AssetKind::Folder, "Docs", None))
            .await
            .unwrap();

        ensure_unique(&repo, "DOCS", None, AssetKind::Folder, Some(docs.id))
            .await
            .unwrap();

        let err = ensure_unique(&repo, "docs", None, AssetKind::Folder, None)
            .await
            .unwrap_err();
        assert_matches!(err, AssetError::NameConflict { kind: AssetKind::Folder, .. });
    }
}
