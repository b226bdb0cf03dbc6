//! Route definitions for the asset tree.
//!
//! All routes are mounted under `/assets`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Asset tree routes mounted at `/assets`.
///
/// ```text
/// GET    /            -> list_assets
/// POST   /folders     -> create_folder
/// POST   /upload      -> upload_files
/// GET    /{id}        -> get_asset
/// PATCH  /{id}        -> update_asset
/// DELETE /{id}        -> delete_asset
/// GET    /{id}/path   -> get_asset_path
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets))
        .route("/folders", post(assets::create_folder))
        .route("/upload", post(assets::upload_files))
        .route(
            "/{id}",
            get(assets::get_asset)
                .patch(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/{id}/path", get(assets::get_asset_path))
}
