//! Repository for the `class_sessions` table.

use crate::error::StoreError;
use crate::models::class_session::{ClassSession, NewClassSession, CLASS_SESSIONS_TABLE};
use crate::store::RowStore;

pub struct ClassSessionRepo;

impl ClassSessionRepo {
    /// Insert the tracking row for a job.
    ///
    /// Some store configurations insert without echoing the row back; the
    /// insert payload stands in for the stored row in that case.
    pub async fn create(
        store: &dyn RowStore,
        input: &NewClassSession,
    ) -> Result<ClassSession, StoreError> {
        let row = input.to_row();
        let rows = store.insert(CLASS_SESSIONS_TABLE, row.clone()).await?;
        Ok(ClassSession::from_row(rows.first().unwrap_or(&row)))
    }
}
