//! Handlers for the asset tree.
//!
//! Thin HTTP adapters over [`depot_core::assets::service::AssetService`]:
//! every tree rule (parent validation, sibling names, cascade cleanup)
//! lives in the service.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use depot_core::assets::model::{AssetFilter, AssetPatch, CreateFolder, FileUpload};
use depot_core::assets::service::UploadOutcome;
use depot_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/v1/assets
///
/// List the children of `parent_id` (roots when omitted), folders first.
/// Optional `kind` and `q` (name substring) filters.
pub async fn list_assets(
    State(state): State<AppState>,
    Query(filter): Query<AssetFilter>,
) -> AppResult<impl IntoResponse> {
    let assets = state.assets.list(&filter).await?;
    Ok(Json(DataResponse { data: assets }))
}

/// GET /api/v1/assets/{id}
pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let asset = state.assets.get(id).await?;
    Ok(Json(DataResponse { data: asset }))
}

/// GET /api/v1/assets/{id}/path
///
/// Breadcrumb from the root folder down to the asset itself.
pub async fn get_asset_path(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let path = state.assets.path(id).await?;
    Ok(Json(DataResponse { data: path }))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/assets/folders
pub async fn create_folder(
    State(state): State<AppState>,
    Json(input): Json<CreateFolder>,
) -> AppResult<impl IntoResponse> {
    let folder = state.assets.create_folder(input).await?;
    tracing::info!(asset_id = folder.id, parent_id = ?folder.parent_id, "Folder created via API");
    Ok((StatusCode::CREATED, Json(DataResponse { data: folder })))
}

/// POST /api/v1/assets/upload
///
/// Accepts a multipart form with an optional `parent_id` field and one or
/// more file fields. Each file becomes its own asset; the response lists a
/// per-file outcome. Responds 201 when every file was created and 207 when
/// at least one failed. Files created before a failure are kept.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut parent_id: Option<DbId> = None;
    let mut uploads: Vec<FileUpload> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "parent_id" {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            parent_id = parse_parent_id(&text)?;
            continue;
        }

        // Any other field carrying a file name is an upload.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue; // ignore unknown fields
        };
        let mime_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        uploads.push(FileUpload {
            file_name,
            mime_type,
            bytes: data.to_vec(),
        });
    }

    let outcomes = state.assets.upload_files(parent_id, uploads).await?;

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, UploadOutcome::Failed { .. }))
        .count();
    tracing::info!(
        parent_id = ?parent_id,
        total = outcomes.len(),
        failed,
        "Upload batch processed",
    );

    let status = if failed == 0 {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(DataResponse { data: outcomes })))
}

/// Parse the multipart `parent_id` field. Empty or `null` means the root.
fn parse_parent_id(raw: &str) -> AppResult<Option<DbId>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("Invalid parent_id '{raw}'")))
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

/// PATCH /api/v1/assets/{id}
///
/// Partial update. `"parent_id": null` moves the asset to the root; an
/// omitted `parent_id` leaves it where it is.
pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<AssetPatch>,
) -> AppResult<impl IntoResponse> {
    let asset = state.assets.update(id, patch).await?;
    Ok(Json(DataResponse { data: asset }))
}

/// DELETE /api/v1/assets/{id}
///
/// Deletes the asset and its whole subtree. Blob cleanup failures are
/// logged and do not fail the request.
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let summary = state.assets.delete(id).await?;
    tracing::info!(
        asset_id = id,
        released = summary.released_blobs.len(),
        failed = summary.failed_blobs.len(),
        "Asset deleted via API",
    );
    Ok(StatusCode::NO_CONTENT)
}
