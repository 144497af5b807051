//! Car inventory routes, all authenticated

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::handlers::cars;
use crate::middleware::require_auth;
use crate::state::AppState;

pub fn car_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/cars", get(cars::list_cars).post(cars::create_car))
        .route(
            "/api/cars/:id",
            get(cars::get_car)
                .put(cars::update_car)
                .delete(cars::delete_car),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}
