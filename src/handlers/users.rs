//! Password account handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{CredentialsRequest, MeResponse, MessageResponse, TokenResponse};
use crate::state::AppState;

/// POST /api/users/signup
pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CredentialsRequest>, ApiError>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.auth_service.signup(&req.email, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// POST /api/users/signin
pub async fn signin(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CredentialsRequest>, ApiError>,
) -> Result<Json<TokenResponse>, ApiError> {
    let issued = state.auth_service.signin(&req.email, &req.password).await?;
    Ok(Json(issued.into()))
}

/// GET /api/users/me
pub async fn me(user: AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse {
        subject: user.subject,
        method: user.method,
        expires_at: user.expires_at,
    })
}
