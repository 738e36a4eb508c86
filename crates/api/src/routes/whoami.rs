use axum::routing::get;
use axum::Router;

use crate::handlers::whoami;
use crate::state::AppState;

/// ```text
/// GET /_whoami    -> whoami (debug)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/_whoami", get(whoami::whoami))
}
