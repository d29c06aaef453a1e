use std::sync::Arc;

use mediashelf_db::Catalog;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// One catalog service per entity type, over the configured backend.
    pub catalog: Arc<Catalog>,
    pub config: Arc<ServerConfig>,
}
