//! Repository for the `assets` tree table.
//!
//! [`AssetRepo`] holds the SQL. [`PgAssetRepository`] adapts it to the
//! domain's [`AssetRepository`] trait so the asset service can run against
//! PostgreSQL.

use async_trait::async_trait;
use depot_core::assets::model::{Asset, AssetFilter, AssetKind, AssetNode, AssetPatch, NewAsset};
use depot_core::assets::repository::AssetRepository;
use depot_core::error::StoreError;
use depot_core::types::DbId;
use sqlx::PgPool;

use crate::models::asset::{AssetNodeRow, AssetRow};

/// Column list for `assets` queries.
const ASSET_COLUMNS: &str = "\
    id, kind, name, parent_id, content_ref, preview_ref, \
    media_kind, mime_type, extension, size_bytes, metadata, \
    created_at, updated_at";

/// Listing order: folders first, then case-insensitive name, then id.
const LIST_ORDER: &str = "\
    CASE kind WHEN 'folder' THEN 0 ELSE 1 END, lower(name), id";

/// Provides CRUD operations for the asset tree.
pub struct AssetRepo;

impl AssetRepo {
    /// Insert a new asset row.
    pub async fn create(pool: &PgPool, input: &NewAsset) -> Result<AssetRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (\
                kind, name, parent_id, content_ref, preview_ref, \
                media_kind, mime_type, extension, size_bytes, metadata\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ASSET_COLUMNS}"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(input.kind.name())
            .bind(&input.name)
            .bind(input.parent_id)
            .bind(input.content_ref.as_deref())
            .bind(input.preview_ref.as_deref())
            .bind(input.media_kind.map(|m| m.name()))
            .bind(input.mime_type.as_deref())
            .bind(input.extension.as_deref())
            .bind(input.size_bytes)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// Find an asset by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Direct children of a folder (id, kind, blob references only).
    pub async fn find_children(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<AssetNodeRow>, sqlx::Error> {
        sqlx::query_as::<_, AssetNodeRow>(
            "SELECT id, kind, content_ref, preview_ref FROM assets WHERE parent_id = $1",
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await
    }

    /// Find a same-kind sibling whose name matches case-insensitively.
    pub async fn find_sibling(
        pool: &PgPool,
        parent_id: Option<DbId>,
        kind: AssetKind,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ASSET_COLUMNS} FROM assets \
             WHERE parent_id IS NOT DISTINCT FROM $1 \
               AND kind = $2 \
               AND lower(name) = lower($3) \
               AND ($4::BIGINT IS NULL OR id <> $4) \
             LIMIT 1"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(parent_id)
            .bind(kind.name())
            .bind(name)
            .bind(exclude_id)
            .fetch_optional(pool)
            .await
    }

    /// Find another asset referencing `reference` as content or preview.
    pub async fn find_by_blob_ref(
        pool: &PgPool,
        reference: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ASSET_COLUMNS} FROM assets \
             WHERE (content_ref = $1 OR preview_ref = $1) \
               AND ($2::BIGINT IS NULL OR id <> $2) \
             LIMIT 1"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(reference)
            .bind(exclude_id)
            .fetch_optional(pool)
            .await
    }

    /// List assets under one parent (roots when `parent_id` is `None`).
    pub async fn list(pool: &PgPool, filter: &AssetFilter) -> Result<Vec<AssetRow>, sqlx::Error> {
        // Build dynamic WHERE clauses.
        let mut conditions = vec!["parent_id IS NOT DISTINCT FROM $1".to_string()];
        let mut bind_idx = 2u32;

        if filter.kind.is_some() {
            conditions.push(format!("kind = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.name_contains.is_some() {
            conditions.push(format!("strpos(lower(name), lower(${bind_idx})) > 0"));
        }

        let query = format!(
            "SELECT {ASSET_COLUMNS} FROM assets \
             WHERE {conditions} \
             ORDER BY {LIST_ORDER}",
            conditions = conditions.join(" AND "),
        );

        let mut q = sqlx::query_as::<_, AssetRow>(&query).bind(filter.parent_id);

        // Bind dynamic parameters in order.
        if let Some(kind) = filter.kind {
            q = q.bind(kind.name());
        }
        if let Some(ref needle) = filter.name_contains {
            q = q.bind(needle.clone());
        }

        q.fetch_all(pool).await
    }

    /// Apply a partial update. `parent_id` is only written when present in
    /// the patch, which lets an explicit `null` move the asset to the root.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &AssetPatch,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET \
                name = COALESCE($2, name), \
                parent_id = CASE WHEN $3 THEN $4 ELSE parent_id END, \
                preview_ref = COALESCE($5, preview_ref), \
                metadata = COALESCE($6, metadata), \
                content_ref = COALESCE($7, content_ref), \
                mime_type = COALESCE($8, mime_type), \
                size_bytes = COALESCE($9, size_bytes), \
                extension = COALESCE($10, extension), \
                media_kind = COALESCE($11, media_kind) \
             WHERE id = $1 \
             RETURNING {ASSET_COLUMNS}"
        );
        sqlx::query_as::<_, AssetRow>(&query)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.parent_id.is_some())
            .bind(input.parent_id.flatten())
            .bind(input.preview_ref.as_deref())
            .bind(input.metadata.as_ref())
            .bind(input.content_ref.as_deref())
            .bind(input.mime_type.as_deref())
            .bind(input.size_bytes)
            .bind(input.extension.as_deref())
            .bind(input.media_kind.map(|m| m.name()))
            .fetch_optional(pool)
            .await
    }

    /// Delete an asset by ID. Descendant rows go with it through
    /// `ON DELETE CASCADE`. Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Trait adapter
// ---------------------------------------------------------------------------

/// [`AssetRepository`] backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgAssetRepository {
    pool: PgPool,
}

impl PgAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn into_asset(row: AssetRow) -> Result<Asset, StoreError> {
    Asset::try_from(row).map_err(StoreError::repository)
}

/// Box a sqlx error for the domain layer. PostgreSQL unique violations
/// (23505) on a `uq_` constraint become [`StoreError::UniqueViolation`].
fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                return StoreError::UniqueViolation {
                    constraint: constraint.to_string(),
                };
            }
        }
    }
    StoreError::repository(err)
}

#[async_trait]
impl AssetRepository for PgAssetRepository {
    async fn get_by_id(&self, id: DbId) -> Result<Option<Asset>, StoreError> {
        AssetRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?
            .map(into_asset)
            .transpose()
    }

    async fn find_children(&self, parent_id: DbId) -> Result<Vec<AssetNode>, StoreError> {
        AssetRepo::find_children(&self.pool, parent_id)
            .await
            .map_err(classify_sqlx_error)?
            .into_iter()
            .map(|row| AssetNode::try_from(row).map_err(StoreError::repository))
            .collect()
    }

    async fn find_sibling(
        &self,
        parent_id: Option<DbId>,
        kind: AssetKind,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<Asset>, StoreError> {
        AssetRepo::find_sibling(&self.pool, parent_id, kind, name, exclude_id)
            .await
            .map_err(classify_sqlx_error)?
            .map(into_asset)
            .transpose()
    }

    async fn find_by_blob_ref(
        &self,
        reference: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<Asset>, StoreError> {
        AssetRepo::find_by_blob_ref(&self.pool, reference, exclude_id)
            .await
            .map_err(classify_sqlx_error)?
            .map(into_asset)
            .transpose()
    }

    async fn insert(&self, input: &NewAsset) -> Result<Asset, StoreError> {
        let row = AssetRepo::create(&self.pool, input)
            .await
            .map_err(classify_sqlx_error)?;
        into_asset(row)
    }

    async fn update(&self, id: DbId, patch: &AssetPatch) -> Result<Option<Asset>, StoreError> {
        AssetRepo::update(&self.pool, id, patch)
            .await
            .map_err(classify_sqlx_error)?
            .map(into_asset)
            .transpose()
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        AssetRepo::delete(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>, StoreError> {
        AssetRepo::list(&self.pool, filter)
            .await
            .map_err(classify_sqlx_error)?
            .into_iter()
            .map(into_asset)
            .collect()
    }
}
