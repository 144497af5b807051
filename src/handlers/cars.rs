//! Car inventory handlers
//!
//! Every route here sits behind `require_auth`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::cars::{Car, CarPayload};
use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::MessageResponse;
use crate::state::AppState;

fn parse_car_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::BadRequest(format!("Invalid car id: {}", id)))
}

/// GET /api/cars
pub async fn list_cars(State(state): State<AppState>) -> Result<Json<Vec<Car>>, ApiError> {
    Ok(Json(state.car_service.list_cars().await?))
}

/// GET /api/cars/:id
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Car>, ApiError> {
    let id = parse_car_id(&id)?;
    Ok(Json(state.car_service.get_car(id).await?))
}

/// POST /api/cars
pub async fn create_car(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    WithRejection(Json(payload), _): WithRejection<Json<CarPayload>, ApiError>,
) -> Result<(StatusCode, Json<Car>), ApiError> {
    let car = state.car_service.create_car(payload).await?;
    tracing::debug!(car_id = %car.id, subject = %user.subject, "Car created by caller");

    Ok((StatusCode::CREATED, Json(car)))
}

/// PUT /api/cars/:id
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<CarPayload>, ApiError>,
) -> Result<Json<Car>, ApiError> {
    let id = parse_car_id(&id)?;
    Ok(Json(state.car_service.update_car(id, payload).await?))
}

/// DELETE /api/cars/:id
pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_car_id(&id)?;
    state.car_service.delete_car(id).await?;

    Ok(Json(MessageResponse::new("Car deleted successfully")))
}
