//! Password account routes

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::handlers::users;
use crate::middleware::{rate_limit, require_auth};
use crate::state::AppState;

pub fn user_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/users/signup", post(users::signup))
        .route("/api/users/signin", post(users::signin))
        .route_layer(from_fn_with_state(state.rate_limiter.clone(), rate_limit));

    let protected = Router::new()
        .route("/api/users/me", get(users::me))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    public.merge(protected)
}
