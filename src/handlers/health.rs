use axum::{extract::State, http::StatusCode, Json};

use crate::db;
use crate::models::HealthResponse;
use crate::state::AppState;

/// GET /
pub async fn root() -> &'static str {
    "Car Inventory API Server"
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = match &state.db_pool {
        Some(pool) => match db::check_health(pool).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Health check failed");
                false
            }
        },
        None => true,
    };

    let (status_code, status) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            storage: state.storage_name().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
