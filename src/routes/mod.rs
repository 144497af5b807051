//! Route definitions for the car inventory API

mod cars;
mod metamask;
mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::handlers::health;
use crate::middleware;
use crate::state::AppState;

pub use cars::car_routes;
pub use metamask::metamask_routes;
pub use users::user_routes;

/// Assemble the full application router with its middleware stack
pub fn app_router(state: AppState, config: &Config) -> Router {
    let mut router: Router = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .merge(metamask_routes(&state))
        .merge(user_routes(&state))
        .merge(car_routes(&state))
        .with_state(state)
        .layer(from_fn(middleware::security_headers));

    if config.environment.is_production() {
        router = router.layer(from_fn(middleware::hsts_header));
    }

    router
        .layer(from_fn(middleware::request_tracing))
        .layer(configure_cors(config.cors_allowed_origins.as_deref()))
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins");
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers(Any)
}
