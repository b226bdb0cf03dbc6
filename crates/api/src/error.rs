use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use depot_core::assets::AssetError;
use depot_core::error::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`AssetError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `depot_core`.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- AssetError variants ---
            AppError::Asset(err) => match err {
                AssetError::InvalidParent(reason) => {
                    (StatusCode::BAD_REQUEST, err.code(), reason.to_string())
                }
                AssetError::NameConflict { .. } => {
                    (StatusCode::CONFLICT, err.code(), err.to_string())
                }
                AssetError::NotFound(id) => (
                    StatusCode::NOT_FOUND,
                    err.code(),
                    format!("Asset with id {id} not found"),
                ),
                AssetError::Validation(msg) => (StatusCode::BAD_REQUEST, err.code(), msg.clone()),
                AssetError::Storage(StoreError::UniqueViolation { constraint }) => (
                    StatusCode::CONFLICT,
                    err.code(),
                    format!("Duplicate value violates unique constraint: {constraint}"),
                ),
                AssetError::Storage(store) => {
                    tracing::error!(error = %store, "Storage error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        err.code(),
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
