use std::sync::Arc;

use portal_storage::local::LocalObjectStore;
use portal_storage::ObjectStore;

use crate::config::ServerConfig;
use crate::mailer::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: portal_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Object storage backend for documents, project images, and avatars.
    pub object_store: Arc<dyn ObjectStore>,
    /// Present when the local backend is active; the `/files/local` route
    /// uses it to verify URL signatures and resolve file paths.
    pub local_store: Option<Arc<LocalObjectStore>>,
    /// Outgoing invite mail.
    pub mailer: Arc<Mailer>,
}
