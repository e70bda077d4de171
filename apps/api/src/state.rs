use sqlx::PgPool;

use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Filesystem-backed store for uploaded files, rooted at the configured
    /// upload directory.
    pub storage: FileStore,
}
