//! Two-step enqueue with a compensating delete.
//!
//! ```text
//! insert job ──err──▶ JobInsert            (nothing committed)
//!     │ok
//! insert session ──err──▶ delete job ──▶ SessionInsert { rollback }
//!     │ok
//! Enqueued
//! ```
//!
//! The two inserts are not atomic. Between them a job exists without a
//! session; if the compensating delete itself fails the job is left
//! orphaned, which callers must tolerate.
//!
//! Handlers go through [`spawn_enqueue`] so that a cancelled request (client
//! disconnect, request timeout) cannot stop the saga between the job insert
//! and its compensation.

use std::sync::Arc;

use corner_core::class_mode::ClassMode;
use corner_core::plan::GenerationPlan;
use corner_core::types::{JobId, UserId};
use corner_db::models::class_session::{ClassSession, NewClassSession};
use corner_db::models::job::{Job, NewJob};
use corner_db::repositories::{ClassSessionRepo, JobRepo};
use corner_db::{RowStore, StoreError};
use tokio::task::JoinHandle;

/// Everything needed to enqueue one class.
#[derive(Debug, Clone)]
pub struct EnqueueRequest {
    /// The plan to render, already adjusted for the class mode.
    pub plan: GenerationPlan,
    pub user_id: Option<UserId>,
    pub class_mode: ClassMode,
}

/// Both rows were written.
#[derive(Debug, Clone)]
pub struct Enqueued {
    pub job: Job,
    pub session: ClassSession,
}

/// Outcome of the compensating delete.
#[derive(Debug)]
pub enum Rollback {
    /// The orphaned job was removed.
    JobDeleted,
    /// The delete failed; the job row may still exist.
    Failed(StoreError),
}

impl Rollback {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::JobDeleted)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnqueueError {
    /// The job row could not be created. Nothing was committed.
    #[error("Failed to create job: {0}")]
    JobInsert(#[source] StoreError),

    /// The session row could not be created after the job was.
    ///
    /// `source` is the primary cause; `rollback` only reports what happened
    /// to the job afterwards.
    #[error("Failed to create class session: {source}")]
    SessionInsert {
        job_id: JobId,
        source: StoreError,
        rollback: Rollback,
    },
}

/// Write the job, then its class session, undoing the job if the second
/// write fails.
pub async fn enqueue(
    store: &dyn RowStore,
    request: EnqueueRequest,
) -> Result<Enqueued, EnqueueError> {
    let EnqueueRequest {
        plan,
        user_id,
        class_mode,
    } = request;

    let job = JobRepo::create(store, &NewJob::queued(plan.clone()))
        .await
        .map_err(EnqueueError::JobInsert)?;

    tracing::debug!(job_id = %job.id, "Job row created");

    let new_session = NewClassSession {
        job_id: job.id.clone(),
        plan,
        user_id,
        class_mode,
    };

    match ClassSessionRepo::create(store, &new_session).await {
        Ok(session) => Ok(Enqueued { job, session }),
        Err(source) => {
            tracing::error!(
                job_id = %job.id,
                error = %source,
                "Class session insert failed, deleting job",
            );
            let rollback = compensate(store, &job.id).await;
            Err(EnqueueError::SessionInsert {
                job_id: job.id,
                source,
                rollback,
            })
        }
    }
}

/// Run [`enqueue`] on its own task. The saga completes even if the returned
/// handle is dropped.
pub fn spawn_enqueue(
    store: Arc<dyn RowStore>,
    request: EnqueueRequest,
) -> JoinHandle<Result<Enqueued, EnqueueError>> {
    tokio::spawn(async move { enqueue(store.as_ref(), request).await })
}

async fn compensate(store: &dyn RowStore, job_id: &JobId) -> Rollback {
    match JobRepo::delete(store, job_id).await {
        Ok(()) => {
            tracing::info!(job_id = %job_id, "Rolled back job after session failure");
            Rollback::JobDeleted
        }
        Err(e) => {
            tracing::error!(
                job_id = %job_id,
                error = %e,
                "Rollback failed, job row left orphaned",
            );
            Rollback::Failed(e)
        }
    }
}
