//! Rows of the `jobs` table consumed by the external audio worker.

use corner_core::plan::GenerationPlan;
use corner_core::types::JobId;
use serde::Serialize;
use serde_json::Value;

use super::key_text;
use crate::error::StoreError;
use crate::store::Row;

pub const JOBS_TABLE: &str = "jobs";

/// Status written on creation. The worker moves jobs on from here.
pub const STATUS_QUEUED: &str = "queued";

/// A job as returned by the insert.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub status: String,
    pub plan: GenerationPlan,
}

impl Job {
    /// Map a stored row. The id is mandatory; other columns are lenient.
    pub fn from_row(row: &Row) -> Result<Self, StoreError> {
        let id = key_text(row.get("id")).ok_or_else(|| {
            StoreError::MissingResult("Job inserted but no id returned".to_string())
        })?;

        Ok(Self {
            id,
            status: row
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or(STATUS_QUEUED)
                .to_string(),
            plan: GenerationPlan::normalize(row.get("plan").unwrap_or(&NULL)),
        })
    }
}

/// Insert payload for a new job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub plan: GenerationPlan,
}

impl NewJob {
    pub fn queued(plan: GenerationPlan) -> Self {
        Self { plan }
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("status".into(), STATUS_QUEUED.into());
        row.insert("plan".into(), self.plan.to_value());
        row.insert("error".into(), Value::Null);
        row.insert("file_url".into(), Value::Null);
        row.insert("storage_path".into(), Value::Null);
        row
    }
}

static NULL: Value = Value::Null;

/// A job row read back for status reporting, kept verbatim.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct JobRecord {
    pub row: Row,
}

impl JobRecord {
    pub fn status(&self) -> &Value {
        self.column("status")
    }

    pub fn file_url(&self) -> &Value {
        self.column("file_url")
    }

    pub fn error(&self) -> &Value {
        self.column("error")
    }

    fn column(&self, name: &str) -> &Value {
        self.row.get(name).unwrap_or(&NULL)
    }
}
