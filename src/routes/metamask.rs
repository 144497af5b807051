//! Wallet authentication routes

use axum::{middleware::from_fn_with_state, routing::post, Router};

use crate::handlers::metamask;
use crate::middleware::rate_limit;
use crate::state::AppState;

/// `getmessage` and `signin` are kept as aliases for older clients
pub fn metamask_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/metamask/challenge", post(metamask::request_challenge))
        .route("/api/metamask/getmessage", post(metamask::request_challenge))
        .route("/api/metamask/verify", post(metamask::verify_signature))
        .route("/api/metamask/signin", post(metamask::verify_signature))
        .route_layer(from_fn_with_state(state.rate_limiter.clone(), rate_limit))
}
