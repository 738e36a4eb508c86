//! Rows of the `class_sessions` tracking table, one per job.

use corner_core::class_mode::ClassMode;
use corner_core::plan::GenerationPlan;
use corner_core::types::{JobId, UserId};
use serde::Serialize;
use serde_json::Value;

use super::job::STATUS_QUEUED;
use super::key_text;
use crate::store::Row;

pub const CLASS_SESSIONS_TABLE: &str = "class_sessions";

/// Insert payload for the session paired with a freshly created job.
#[derive(Debug, Clone)]
pub struct NewClassSession {
    pub job_id: JobId,
    pub plan: GenerationPlan,
    /// `None` for guests.
    pub user_id: Option<UserId>,
    pub class_mode: ClassMode,
}

impl NewClassSession {
    /// Guest sessions are public.
    pub fn is_public(&self) -> bool {
        self.user_id.is_none()
    }

    /// Plan fields are copied onto the session for analytics queries.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("job_id".into(), self.job_id.clone().into());
        row.insert("difficulty".into(), self.plan.difficulty.as_str().into());
        row.insert("length_min".into(), self.plan.length_min.into());
        row.insert("pace".into(), self.plan.pace.as_str().into());
        row.insert("music".into(), self.plan.music.clone().into());
        row.insert(
            "user_id".into(),
            self.user_id.clone().map_or(Value::Null, Value::String),
        );
        row.insert("is_public".into(), self.is_public().into());
        row.insert("class_mode".into(), self.class_mode.as_str().into());
        row.insert("status".into(), STATUS_QUEUED.into());
        row.insert("started_at".into(), Value::Null);
        row.insert("completed_at".into(), Value::Null);
        row
    }
}

/// A stored class session.
#[derive(Debug, Clone, Serialize)]
pub struct ClassSession {
    pub id: Option<String>,
    pub job_id: Option<JobId>,
    pub user_id: Option<UserId>,
    pub is_public: bool,
    pub status: Option<String>,
}

impl ClassSession {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: key_text(row.get("id")),
            job_id: key_text(row.get("job_id")),
            user_id: row
                .get("user_id")
                .and_then(Value::as_str)
                .map(str::to_string),
            is_public: row
                .get("is_public")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            status: row
                .get("status")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}
