pub mod generate;
pub mod health;
pub mod jobs;
pub mod whoami;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree.
///
/// ```text
/// /generate                 enqueue a class (POST)
/// /job-status/{job_id}      job row and status (GET)
/// /_whoami                  credential/backends debug view (GET)
/// ```
///
/// Liveness (`/`) and `/health` live in [`health::router`].
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(generate::router())
        .merge(jobs::router())
        .merge(whoami::router())
}
