//! Authentication middleware
//!
//! Bearer token verification for protected routes, either as a route layer
//! (`require_auth`) or as a handler extractor (`AuthenticatedUser`).

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::{AuthMethod, AuthService, JwtError};

/// Caller identity taken from a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Wallet address or account email
    pub subject: String,
    pub method: AuthMethod,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Error response for authentication failures
#[derive(Debug, Serialize)]
struct AuthRejection {
    error: AuthRejectionDetails,
}

#[derive(Debug, Serialize)]
struct AuthRejectionDetails {
    code: &'static str,
    message: &'static str,
}

impl AuthRejection {
    fn new(code: &'static str, message: &'static str) -> Self {
        Self {
            error: AuthRejectionDetails { code, message },
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already verified by `require_auth`
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AuthRejection::new(
                        "MISSING_TOKEN",
                        "Authorization header with Bearer token required",
                    )
                    .into_response()
                })?;

        let auth_service = Arc::<AuthService>::from_ref(state);

        let claims = auth_service.validate_token(bearer.token()).map_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
            let rejection = match e {
                JwtError::TokenExpired => AuthRejection::new("TOKEN_EXPIRED", "Token has expired"),
                _ => AuthRejection::new("INVALID_TOKEN", "Invalid token"),
            };
            rejection.into_response()
        })?;

        Ok(AuthenticatedUser {
            expires_at: claims.expires_at(),
            subject: claims.sub,
            method: claims.method,
            jti: claims.jti,
        })
    }
}

/// Route layer rejecting requests without a valid bearer token
///
/// Use with `axum::middleware::from_fn_with_state`. The verified identity is
/// stored in the request extensions for downstream extractors.
pub async fn require_auth(
    State(auth_service): State<Arc<AuthService>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let user = match AuthenticatedUser::from_request_parts(&mut parts, &auth_service).await {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    tracing::debug!(subject = %user.subject, "Request authenticated");
    parts.extensions.insert(user);

    next.run(Request::from_parts(parts, body)).await
}
