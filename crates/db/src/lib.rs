//! Persistence layer for the Corner enqueue service.
//!
//! Tables live in an externally managed Postgres (normally a Supabase
//! project). Handlers talk to them through the [`RowStore`] trait, which has
//! three backends:
//!
//! - [`RestStore`] -- PostgREST over HTTP (the default).
//! - [`PgStore`] -- direct Postgres via sqlx when `DATABASE_URL` is set.
//! - [`MemoryStore`] -- in-process tables for tests and local runs.
//!
//! Repositories in [`repositories`] map raw rows onto the typed models in
//! [`models`].

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod models;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use store::memory::MemoryStore;
pub use store::pg::PgStore;
pub use store::rest::RestStore;
pub use store::{Row, RowStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
