//! Wallet authentication handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::models::{ChallengeRequest, ChallengeResponse, TokenResponse, VerifyRequest};
use crate::state::AppState;

/// POST /api/metamask/challenge - Issue a message for the wallet to sign
pub async fn request_challenge(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ChallengeRequest>, ApiError>,
) -> Result<(StatusCode, Json<ChallengeResponse>), ApiError> {
    let challenge = state
        .auth_service
        .issue_challenge(&req.address)
        .await
        .map_err(|e| match e {
            AuthError::InvalidAddress(_) => ApiError::from(e),
            e => {
                tracing::error!(error = %e, "Failed to issue challenge");
                ApiError::BadRequest("Could not issue challenge".to_string())
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ChallengeResponse {
            message: challenge.message,
            expires_at: challenge.expires_at,
        }),
    ))
}

/// POST /api/metamask/verify - Exchange a signed challenge for a token
///
/// Anything that does not prove control of a challenged address, including
/// an unreadable body, is answered with 401.
pub async fn verify_signature(
    State(state): State<AppState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Unreadable verification request");
        ApiError::Unauthorized("Invalid verification request".to_string())
    })?;

    let issued = state
        .auth_service
        .verify_wallet(&req.address, &req.signature)
        .await?;

    Ok(Json(issued.into()))
}
