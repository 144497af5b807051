//! JWT token generation and validation
//!
//! Bearer tokens are HS256-signed claim sets bound to a subject (a wallet
//! address or an account email) with an absolute expiry. They are not
//! persisted; validity is the signature plus the expiry check.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT-related errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// How the subject proved its identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Wallet,
    Password,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject: normalized wallet address or account email
    pub sub: String,
    /// Authentication flow that produced the token
    pub method: AuthMethod,
    /// JWT ID
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// A freshly signed token together with its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs and validates bearer tokens with a process-wide secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for `subject` that expires `ttl_seconds` from now
    pub fn issue(&self, subject: &str, method: AuthMethod) -> Result<IssuedToken, JwtError> {
        self.issue_at(subject, method, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        subject: &str,
        method: AuthMethod,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, JwtError> {
        let exp = Duration::try_seconds(self.ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                JwtError::EncodingFailed(format!(
                    "token lifetime of {}s is out of range",
                    self.ttl_seconds
                ))
            })?;

        let claims = Claims {
            sub: subject.to_string(),
            method,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}
