use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use corner_db::StoreError;
use serde_json::{json, Map, Value};

use crate::engine::{EnqueueError, Rollback};

/// Application-level error type for HTTP handlers.
///
/// Every variant renders as `{ "status": "error", "error": ..., "code": ... }`
/// with an optional `details`. Store failures are passed through verbatim;
/// only internal errors are sanitized.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A row store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The enqueue saga failed.
    #[error(transparent)]
    Enqueue(#[from] EnqueueError),

    /// The request body could not be read (too large, aborted).
    #[error(transparent)]
    Body(#[from] BytesRejection),

    /// The request did not finish within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut extra = Map::new();

        let (status, code, message, details) = match &self {
            // --- Store errors ---
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    err.to_string(),
                    err.details(),
                )
            }

            // --- Enqueue saga ---
            AppError::Enqueue(err) => {
                let details = match err {
                    EnqueueError::JobInsert(source) => source.details(),
                    EnqueueError::SessionInsert {
                        job_id,
                        source,
                        rollback,
                    } => {
                        extra.insert("job_id".into(), json!(job_id));
                        match rollback {
                            Rollback::JobDeleted => {
                                extra.insert("rollback".into(), json!("job_deleted"));
                            }
                            Rollback::Failed(e) => {
                                extra.insert("rollback".into(), json!("failed"));
                                extra.insert("rollback_error".into(), json!(e.to_string()));
                            }
                        }
                        source.details()
                    }
                };
                let code = match err {
                    EnqueueError::JobInsert(_) => "JOB_CREATE_FAILED",
                    EnqueueError::SessionInsert { .. } => "SESSION_CREATE_FAILED",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, code, err.to_string(), details)
            }

            // --- HTTP-specific errors ---
            AppError::Body(rejection) => {
                let status = rejection.status();
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "BAD_REQUEST"
                };
                (status, code, rejection.body_text(), None)
            }
            AppError::Timeout => {
                tracing::warn!("Request timed out");
                (
                    StatusCode::REQUEST_TIMEOUT,
                    "REQUEST_TIMEOUT",
                    self.to_string(),
                    None,
                )
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = Map::new();
        body.insert("status".into(), json!("error"));
        body.insert("error".into(), json!(message));
        body.insert("code".into(), json!(code));
        if let Some(details) = details {
            body.insert("details".into(), json!(details));
        }
        body.extend(extra);

        (status, axum::Json(Value::Object(body))).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String, Option<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}
