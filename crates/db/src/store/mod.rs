//! The [`RowStore`] abstraction and helpers shared by its backends.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

pub mod memory;
pub mod pg;
pub mod rest;

/// One table row as returned by the store, keyed by column name.
pub type Row = Map<String, Value>;

/// Minimal table access: insert, select-by-equality, delete-by-equality.
///
/// Every backend normalizes its native responses into `Vec<Row>` or a
/// [`StoreError`], so callers never inspect backend-specific shapes.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Short backend name for logs and the debug endpoint.
    fn backend(&self) -> &'static str;

    /// Insert one row and return the stored representation.
    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError>;

    /// Return every row whose `column` equals `value`.
    async fn select_eq(&self, table: &str, column: &str, value: &str)
        -> Result<Vec<Row>, StoreError>;

    /// Delete every row whose `column` equals `value`.
    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> Result<(), StoreError>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Normalize a JSON response body into rows.
///
/// Accepts an array of objects, a single object, or `null` (no rows).
pub(crate) fn rows_from_value(value: Value) -> Result<Vec<Row>, StoreError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(row) => Ok(vec![row]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(StoreError::Malformed(format!(
                    "expected a row object, got {other}"
                ))),
            })
            .collect(),
        other => Err(StoreError::Malformed(format!(
            "expected rows, got {other}"
        ))),
    }
}

/// Reject table and column names that are not plain lowercase SQL identifiers.
pub(crate) fn validate_identifier(name: &str) -> Result<&str, StoreError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest && name.len() <= 63 {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}
