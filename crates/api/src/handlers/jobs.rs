//! Handler for `GET /job-status/{job_id}`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use corner_db::models::job::JobRecord;
use corner_db::repositories::JobRepo;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::state::AppState;

/// Status summary plus the full stored row.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse<'a> {
    pub status: &'a Value,
    pub file_url: &'a Value,
    pub error: &'a Value,
    pub job: &'a JobRecord,
}

/// GET /job-status/{job_id}
///
/// Returns 200 with the job row, or 404 `{"status": "not_found"}`.
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Response> {
    let Some(record) = JobRepo::find_by_id(state.store.as_ref(), &job_id).await? else {
        tracing::debug!(job_id = %job_id, "Job not found");
        return Ok((StatusCode::NOT_FOUND, Json(json!({ "status": "not_found" }))).into_response());
    };

    let body = JobStatusResponse {
        status: record.status(),
        file_url: record.file_url(),
        error: record.error(),
        job: &record,
    };
    Ok(Json(body).into_response())
}
