use std::sync::Arc;

use corner_db::RowStore;

use crate::auth::verifier::IdentityVerifier;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Row store holding jobs, class sessions, and subscriptions.
    pub store: Arc<dyn RowStore>,
    /// Bearer-token verifier for optional caller identity.
    pub identity: Arc<dyn IdentityVerifier>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
