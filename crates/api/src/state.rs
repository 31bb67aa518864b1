use std::sync::Arc;

use crate::config::ServerConfig;
use crate::import::store::ImportSessionStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ataka_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// In-memory registry of running/recent import sessions.
    pub import_sessions: Arc<ImportSessionStore>,
}
