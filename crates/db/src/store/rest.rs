//! PostgREST backend (`{SUPABASE_URL}/rest/v1/{table}`).
//!
//! Every request carries the service-role key both as `apikey` and as a
//! bearer token, so row-level security is bypassed exactly as the service
//! role intends.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;

use super::{rows_from_value, validate_identifier, Row, RowStore};
use crate::error::StoreError;

/// Error body PostgREST returns on non-2xx responses.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Row store backed by a Supabase PostgREST endpoint.
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestStore {
    pub fn new(client: reqwest::Client, supabase_url: &str, service_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: supabase_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> Result<String, StoreError> {
        let table = validate_identifier(table)?;
        Ok(format!("{}/rest/v1/{table}", self.base_url))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Turn a PostgREST response into rows or a [`StoreError::Rejected`].
    async fn read_rows(response: Response) -> Result<Vec<Row>, StoreError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(rejection(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value = serde_json::from_str(&body)
            .map_err(|e| StoreError::Malformed(format!("invalid JSON from store: {e}")))?;
        rows_from_value(value)
    }
}

/// Build a rejection from a non-2xx PostgREST body, falling back to raw text.
fn rejection(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(err) => {
            let details = match (err.details, err.hint) {
                (Some(d), Some(h)) => Some(format!("{d} (hint: {h})")),
                (Some(d), None) => Some(d),
                (None, Some(h)) => Some(format!("hint: {h}")),
                (None, None) => None,
            };
            StoreError::Rejected {
                status: Some(status),
                code: err.code,
                message: err
                    .message
                    .unwrap_or_else(|| format!("Store returned HTTP {status}")),
                details,
            }
        }
        Err(_) => StoreError::Rejected {
            status: Some(status),
            code: None,
            message: format!("Store returned HTTP {status}"),
            details: Some(body.trim().to_string()).filter(|b| !b.is_empty()),
        },
    }
}

#[async_trait]
impl RowStore for RestStore {
    fn backend(&self) -> &'static str {
        "postgrest"
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Self::read_rows(response).await
    }

    async fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<Row>, StoreError> {
        let url = self.table_url(table)?;
        let column = validate_identifier(column)?;
        let response = self
            .request(Method::GET, &url)
            .query(&[("select", "*".to_string()), (column, format!("eq.{value}"))])
            .send()
            .await?;
        Self::read_rows(response).await
    }

    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> Result<(), StoreError> {
        let url = self.table_url(table)?;
        let column = validate_identifier(column)?;
        let response = self
            .request(Method::DELETE, &url)
            .header("Prefer", "return=minimal")
            .query(&[(column, format!("eq.{value}"))])
            .send()
            .await?;
        Self::read_rows(response).await.map(|_| ())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}/rest/v1/", self.base_url);
        let response = self.request(Method::GET, &url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(rejection(status.as_u16(), &body))
        }
    }
}
