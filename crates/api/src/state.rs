use std::sync::Arc;

use depot_core::assets::service::AssetService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Asset tree operations over the configured row and blob stores.
    pub assets: AssetService,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Database pool, probed by the health check. `None` when the service
    /// runs against non-database collaborators.
    pub pool: Option<depot_db::DbPool>,
}
