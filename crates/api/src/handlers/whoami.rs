//! Handler for the `GET /_whoami` debug endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::service_key::{inspect_service_key, ServiceKeyClaims};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub supabase_url_configured: bool,
    pub service_key_configured: bool,
    pub store_backend: &'static str,
    pub identity_backend: &'static str,
    /// Decoded for display only; see [`crate::auth::service_key`].
    pub service_key_claims: Option<ServiceKeyClaims>,
}

/// GET /_whoami
///
/// Reports which backends are wired up and the service credential's
/// non-sensitive claims. Never echoes the credential itself.
pub async fn whoami(State(state): State<AppState>) -> Json<WhoAmIResponse> {
    let supabase = &state.config.supabase;

    Json(WhoAmIResponse {
        supabase_url_configured: !supabase.url.is_empty(),
        service_key_configured: !supabase.service_key.is_empty(),
        store_backend: state.store.backend(),
        identity_backend: state.identity.backend(),
        service_key_claims: inspect_service_key(&supabase.service_key),
    })
}
