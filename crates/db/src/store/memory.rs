//! In-process backend for tests and local runs without a database.
//!
//! Inserted rows get a UUID `id` and a `created_at` timestamp when they
//! don't carry one, mimicking the column defaults of the real tables. With
//! the `test-support` feature, individual operations can be made to fail.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::{Row, RowStore};
use crate::error::StoreError;

/// A recorded `delete_eq` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCall {
    pub table: String,
    pub column: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    Insert,
    Select,
    Delete,
}

#[derive(Default)]
struct Tables {
    rows: HashMap<String, Vec<Row>>,
    failures: HashMap<(String, Op), String>,
    empty_inserts: HashSet<String>,
    deletes: Vec<DeleteCall>,
}

impl Tables {
    fn check(&self, table: &str, op: Op) -> Result<(), StoreError> {
        match self.failures.get(&(table.to_string(), op)) {
            Some(message) => Err(StoreError::Rejected {
                status: None,
                code: None,
                message: message.clone(),
                details: None,
            }),
            None => Ok(()),
        }
    }
}

/// Thread-safe in-memory tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of every row currently in `table`.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().rows.get(table).cloned().unwrap_or_default()
    }

    /// Every `delete_eq` call made so far, including failed ones.
    pub fn delete_calls(&self) -> Vec<DeleteCall> {
        self.lock().deletes.clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl MemoryStore {
    /// Make inserts into `table` fail with `message`.
    pub fn fail_inserts(&self, table: &str, message: &str) {
        self.set_failure(table, Op::Insert, message);
    }

    /// Make selects from `table` fail with `message`.
    pub fn fail_selects(&self, table: &str, message: &str) {
        self.set_failure(table, Op::Select, message);
    }

    /// Make deletes from `table` fail with `message`.
    pub fn fail_deletes(&self, table: &str, message: &str) {
        self.set_failure(table, Op::Delete, message);
    }

    /// Store inserted rows in `table` but report zero rows back.
    pub fn return_no_rows_on_insert(&self, table: &str) {
        self.lock().empty_inserts.insert(table.to_string());
    }

    /// Seed a row verbatim, bypassing id and timestamp defaults.
    pub fn seed(&self, table: &str, row: Row) {
        self.lock().rows.entry(table.to_string()).or_default().push(row);
    }

    fn set_failure(&self, table: &str, op: Op, message: &str) {
        self.lock()
            .failures
            .insert((table.to_string(), op), message.to_string());
    }
}

/// Text form of a cell for equality filters, matching `column::text = value`.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches(row: &Row, column: &str, value: &str) -> bool {
    row.get(column)
        .and_then(cell_text)
        .is_some_and(|cell| cell == value)
}

#[async_trait]
impl RowStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, table: &str, mut row: Row) -> Result<Vec<Row>, StoreError> {
        let mut tables = self.lock();
        tables.check(table, Op::Insert)?;

        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        row.entry("created_at")
            .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));

        tables
            .rows
            .entry(table.to_string())
            .or_default()
            .push(row.clone());

        if tables.empty_inserts.contains(table) {
            Ok(Vec::new())
        } else {
            Ok(vec![row])
        }
    }

    async fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<Row>, StoreError> {
        let tables = self.lock();
        tables.check(table, Op::Select)?;

        Ok(tables
            .rows
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, column, value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> Result<(), StoreError> {
        let mut tables = self.lock();
        tables.deletes.push(DeleteCall {
            table: table.to_string(),
            column: column.to_string(),
            value: value.to_string(),
        });
        tables.check(table, Op::Delete)?;

        if let Some(rows) = tables.rows.get_mut(table) {
            rows.retain(|row| !matches(row, column, value));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
