//! Application state shared across handlers

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::accounts::{InMemoryAccountStore, PgAccountStore};
use crate::auth::AuthService;
use crate::cars::{CarService, InMemoryCarStore, PgCarStore};
use crate::challenge::{InMemoryChallengeStore, PgChallengeStore};
use crate::config::Config;
use crate::middleware::RateLimiter;

/// Rate-limiter buckets idle this long are dropped by the cleanup task
const RATE_LIMIT_BUCKET_MAX_AGE: Duration = Duration::from_secs(600);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub car_service: Arc<CarService>,
    pub rate_limiter: RateLimiter,
    /// Present when running on Postgres; used by the health check
    pub db_pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        car_service: Arc<CarService>,
        rate_limiter: RateLimiter,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            auth_service,
            car_service,
            rate_limiter,
            db_pool,
        }
    }

    /// Wire every service to process-local stores
    pub fn in_memory(config: &Config) -> Self {
        let auth_service = AuthService::from_config(
            config,
            Arc::new(InMemoryChallengeStore::new()),
            Arc::new(InMemoryAccountStore::new()),
        );

        Self::new(
            Arc::new(auth_service),
            Arc::new(CarService::new(Arc::new(InMemoryCarStore::new()))),
            RateLimiter::new(config.rate_limit_auth_rps),
            None,
        )
    }

    /// Wire every service to Postgres-backed stores
    pub fn postgres(config: &Config, db_pool: PgPool) -> Self {
        let auth_service = AuthService::from_config(
            config,
            Arc::new(PgChallengeStore::new(db_pool.clone())),
            Arc::new(PgAccountStore::new(db_pool.clone())),
        );

        Self::new(
            Arc::new(auth_service),
            Arc::new(CarService::new(Arc::new(PgCarStore::new(db_pool.clone())))),
            RateLimiter::new(config.rate_limit_auth_rps),
            Some(db_pool),
        )
    }

    pub fn storage_name(&self) -> &'static str {
        if self.db_pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<CarService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.car_service.clone()
    }
}

impl FromRef<AppState> for RateLimiter {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rate_limiter.clone()
    }
}

/// Periodically purge expired challenges and idle rate-limiter buckets
///
/// Runs until the task is aborted.
pub async fn cleanup_task(state: AppState, interval: Duration) {
    tracing::info!(interval_secs = interval.as_secs(), "Starting cleanup task");

    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match state.auth_service.purge_expired_challenges().await {
            Ok(0) => {}
            Ok(purged) => tracing::info!(purged, "Expired challenges purged"),
            Err(e) => tracing::error!(error = %e, "Failed to purge expired challenges"),
        }

        let dropped = state.rate_limiter.cleanup(RATE_LIMIT_BUCKET_MAX_AGE).await;
        if dropped > 0 {
            tracing::debug!(dropped, "Idle rate limit buckets dropped");
        }
    }
}
