//! Postgres storage bootstrap
//!
//! Builds the pool shared by the challenge, account and car stores and
//! applies the embedded schema in `migrations/` before the server accepts
//! requests.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Could not open Postgres pool: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Schema migration failed: {0}")]
    Migrate(#[source] sqlx::migrate::MigrateError),

    #[error("Postgres did not answer the health check: {0}")]
    Unhealthy(#[source] sqlx::Error),
}

/// Open a pool of at most `max_connections` (never fewer than one)
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, DbError> {
    let max_connections = max_connections.max(1);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(DbError::Connect)?;

    tracing::info!(max_connections, "Postgres pool ready");

    Ok(pool)
}

/// Apply pending migrations for the challenge, account and car tables
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    let migrator = sqlx::migrate!("./migrations");
    tracing::info!(available = migrator.iter().count(), "Applying schema migrations");

    migrator.run(pool).await.map_err(DbError::Migrate)?;

    tracing::info!("Schema is up to date");
    Ok(())
}

/// Round-trip a trivial query; used by `GET /health`
pub async fn check_health(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
        .map_err(DbError::Unhealthy)
}
