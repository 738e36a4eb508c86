use axum::routing::get;
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// ```text
/// GET /job-status/{job_id}    -> job_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/job-status/{job_id}", get(jobs::job_status))
}
