//! Handler for `POST /generate`.
//!
//! Identity is optional: guests get `user_id: null` and a public session.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use corner_core::class_mode::{ClassMode, SubscriptionTier};
use corner_core::plan::GenerationPlan;
use corner_core::types::{JobId, UserId};
use serde::Serialize;
use serde_json::Value;

use crate::engine::{spawn_enqueue, EnqueueRequest};
use crate::error::{AppError, AppResult};
use crate::middleware::caller::Caller;
use crate::state::AppState;

/// Body of a `202 Accepted` response.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub status: &'static str,
    pub job_id: JobId,
    pub user_id: Option<UserId>,
    pub class_mode: ClassMode,
    pub plan_tier: SubscriptionTier,
    pub plan: GenerationPlan,
}

/// Parse the request body. An empty body counts as `{}`.
pub fn parse_json_body(body: &[u8]) -> AppResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}

/// POST /generate
///
/// Normalize the requested plan, apply the demo policy, and enqueue a job
/// plus its class session. Returns 202 with the job id.
///
/// The saga runs on its own task; if this request is cancelled the writes
/// (and any compensation) still finish.
pub async fn generate(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<impl IntoResponse> {
    let payload = parse_json_body(&body?)?;

    let requested = GenerationPlan::normalize(&payload);
    let class_mode = state
        .config
        .demo
        .class_mode(caller.is_anonymous(), caller.tier);
    let plan = class_mode.apply(requested);

    let enqueued = spawn_enqueue(
        state.store.clone(),
        EnqueueRequest {
            plan: plan.clone(),
            user_id: caller.user_id.clone(),
            class_mode,
        },
    )
    .await
    .map_err(|e| AppError::InternalError(format!("Enqueue task failed: {e}")))??;

    tracing::info!(
        job_id = %enqueued.job.id,
        session_id = enqueued.session.id.as_deref().unwrap_or("unknown"),
        user_id = caller.user_id.as_deref().unwrap_or("guest"),
        class_mode = %class_mode,
        length_min = plan.length_min,
        "Job queued",
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            status: "queued",
            job_id: enqueued.job.id,
            user_id: caller.user_id,
            class_mode,
            plan_tier: caller.tier,
            plan,
        }),
    ))
}
