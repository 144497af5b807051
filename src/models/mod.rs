//! Request and response bodies for the HTTP API
//!
//! Request fields default to empty so that missing values are reported by
//! validation with a JSON error body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthMethod, IssuedToken};

/// Request for a wallet challenge
#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    /// Text the wallet must sign
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Signed challenge submitted for verification
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default, alias = "signedMessage")]
    pub signature: String,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            expires_at: issued.claims.expires_at(),
            token: issued.token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The authenticated caller
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub subject: String,
    pub method: AuthMethod,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub version: String,
}
