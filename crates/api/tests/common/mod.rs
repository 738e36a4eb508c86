#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use corner_api::auth::verifier::{IdentityError, IdentityVerifier};
use corner_api::config::ServerConfig;
use corner_api::router::build_app_router;
use corner_api::state::AppState;
use corner_core::types::UserId;
use corner_db::{MemoryStore, Row, RowStore, StoreError};

/// Build a test `ServerConfig` with safe defaults.
///
/// Any CORS origin, demo mode off, no direct database.
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(|name| match name {
        "SUPABASE_URL" => Some("https://project.supabase.co".into()),
        "SUPABASE_SERVICE_ROLE_KEY" => Some("service-role-key".into()),
        "HOST" => Some("127.0.0.1".into()),
        "PORT" => Some("0".into()),
        _ => None,
    })
    .expect("test config must load")
}

/// Verifier that accepts a fixed set of tokens.
#[derive(Default)]
pub struct TestVerifier {
    tokens: HashMap<String, UserId>,
}

impl TestVerifier {
    pub fn with_token(mut self, token: &str, user_id: &str) -> Self {
        self.tokens.insert(token.to_string(), user_id.to_string());
        self
    }
}

#[async_trait]
impl IdentityVerifier for TestVerifier {
    fn backend(&self) -> &'static str {
        "test"
    }

    async fn verify(&self, token: &str) -> Result<UserId, IdentityError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(IdentityError::Rejected(401))
    }
}

/// Build the full application router over an in-memory store.
///
/// Goes through `build_app_router` so tests exercise the same middleware
/// stack (CORS, request ID, timeout, tracing, panic recovery) production
/// uses.
pub fn build_test_app(store: Arc<MemoryStore>, verifier: TestVerifier) -> Router {
    build_app_with_config(store, verifier, test_config())
}

/// Same as [`build_test_app`] with demo mode switched on.
pub fn build_demo_app(store: Arc<MemoryStore>, verifier: TestVerifier) -> Router {
    let mut config = test_config();
    config.demo.enabled = true;
    build_app_with_config(store, verifier, config)
}

pub fn build_app_with_config(
    store: Arc<MemoryStore>,
    verifier: TestVerifier,
    config: ServerConfig,
) -> Router {
    build_app_with_store(store, verifier, config)
}

pub fn build_app_with_store(
    store: Arc<dyn RowStore>,
    verifier: TestVerifier,
    config: ServerConfig,
) -> Router {
    let state = AppState {
        store,
        identity: Arc::new(verifier),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Wraps a [`MemoryStore`] and delays every insert into one table.
pub struct StallingStore {
    pub inner: Arc<MemoryStore>,
    pub table: &'static str,
    pub delay: Duration,
}

#[async_trait]
impl RowStore for StallingStore {
    fn backend(&self) -> &'static str {
        "stalling"
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError> {
        if table == self.table {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.insert(table, row).await
    }

    async fn select_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<Row>, StoreError> {
        self.inner.select_eq(table, column, value).await
    }

    async fn delete_eq(&self, table: &str, column: &str, value: &str) -> Result<(), StoreError> {
        self.inner.delete_eq(table, column, value).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// Poll `condition` every 50ms for up to `within`.
pub async fn eventually(within: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}

/// Turn a `json!` object literal into a store row.
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    post_raw(app, uri, &body.to_string()).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
