//! Repository for the `jobs` table.

use corner_core::types::JobId;

use crate::error::StoreError;
use crate::models::job::{Job, JobRecord, NewJob, JOBS_TABLE};
use crate::store::RowStore;

/// Create, read, and compensate-delete jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a queued job and return it with its store-assigned id.
    ///
    /// An insert that reports no rows, or a row without an id, is an error:
    /// nothing downstream can reference the job.
    pub async fn create(store: &dyn RowStore, input: &NewJob) -> Result<Job, StoreError> {
        let rows = store.insert(JOBS_TABLE, input.to_row()).await?;
        let row = rows
            .first()
            .ok_or_else(|| StoreError::MissingResult("Insert returned no rows".to_string()))?;
        Job::from_row(row)
    }

    /// Fetch the full stored row for a job.
    pub async fn find_by_id(
        store: &dyn RowStore,
        id: &str,
    ) -> Result<Option<JobRecord>, StoreError> {
        let rows = store.select_eq(JOBS_TABLE, "id", id).await?;
        Ok(rows.into_iter().next().map(|row| JobRecord { row }))
    }

    /// Delete a job. Only used to undo a job whose session insert failed.
    pub async fn delete(store: &dyn RowStore, id: &JobId) -> Result<(), StoreError> {
        store.delete_eq(JOBS_TABLE, "id", id).await
    }
}
