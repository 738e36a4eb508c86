//! Integration tests for the `GET /_whoami` debug endpoint.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get, TestVerifier};
use corner_db::MemoryStore;

#[tokio::test]
async fn reports_backends_without_leaking_the_key() {
    let app = common::build_test_app(Arc::new(MemoryStore::new()), TestVerifier::default());

    let response = get(app, "/_whoami").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["supabase_url_configured"], true);
    assert_eq!(json["service_key_configured"], true);
    assert_eq!(json["store_backend"], "memory");
    assert_eq!(json["identity_backend"], "test");
    // The test key is not a JWT, so there are no claims to show.
    assert!(json["service_key_claims"].is_null());
    assert!(!json.to_string().contains("service-role-key"));
}
