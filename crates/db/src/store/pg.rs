//! Direct Postgres backend.
//!
//! Rows travel as `jsonb`: inserts go through `jsonb_populate_record` so
//! the table's own column types drive conversion, and reads come back as
//! `to_jsonb(row)`. Only the columns present in the row are written, so
//! column defaults (ids, timestamps) still apply.

use async_trait::async_trait;
use serde_json::Value;

use super::{validate_identifier, Row, RowStore};
use crate::error::StoreError;
use crate::DbPool;

/// Row store talking to Postgres through a sqlx pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Build the `INSERT` for the given table and column names.
fn insert_sql(table: &str, columns: &[&str]) -> Result<String, StoreError> {
    let table = quote_ident(table)?;

    if columns.is_empty() {
        return Ok(format!(
            "INSERT INTO {table} DEFAULT VALUES RETURNING to_jsonb({table}.*)"
        ));
    }

    let columns = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Result<Vec<_>, _>>()?
        .join(", ");

    Ok(format!(
        "INSERT INTO {table} ({columns}) \
         SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) \
         RETURNING to_jsonb({table}.*)"
    ))
}

fn quote_ident(name: &str) -> Result<String, StoreError> {
    validate_identifier(name).map(|n| format!("\"{n}\""))
}

fn into_rows(values: Vec<Value>) -> Result<Vec<Row>, StoreError> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Object(row) => Ok(row),
            other => Err(StoreError::Malformed(format!(
                "expected a row object, got {other}"
            ))),
        })
        .collect()
}

#[async_trait]
impl RowStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError> {
        let sql = {
            let columns: Vec<&str> = row.keys().map(String::as_str).collect();
            insert_sql(table, &columns)?
        };

        let values = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(row))
            .fetch_all(&self.pool)
            .await?;
        into_rows(values)
    }

    async fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<Row>, StoreError> {
        let sql = format!(
            "SELECT to_jsonb(t.*) FROM {} AS t WHERE t.{}::text = $1",
            quote_ident(table)?,
            quote_ident(column)?,
        );

        let values = sqlx::query_scalar::<_, Value>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        into_rows(values)
    }

    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> Result<(), StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE {}::text = $1",
            quote_ident(table)?,
            quote_ident(column)?,
        );

        sqlx::query(&sql).bind(value).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
