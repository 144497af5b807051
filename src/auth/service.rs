//! Authentication service
//!
//! Orchestrates challenge issuance, wallet signature verification and the
//! password signup/signin path. Both flows end in the same token issuance.

use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;

use super::address::{AddressError, WalletAddress};
use super::crypto::verify_wallet_signature;
use super::jwt::{AuthMethod, Claims, IssuedToken, JwtError, TokenIssuer};
use super::password::{hash_password, verify_password, PasswordError};
use crate::accounts::{normalize_email, Account, AccountStore, AccountStoreError, NewAccount};
use crate::challenge::{
    generate_challenge_message, ChallengeRecord, ChallengeStore, ChallengeStoreError,
};
use crate::config::Config;
use crate::error::ApiError;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("{0}")]
    Validation(String),

    #[error("No challenge issued for {0}")]
    ChallengeNotFound(WalletAddress),

    /// An address that cannot be parsed never has a challenge on record
    #[error("Unknown wallet address: {0}")]
    UnknownAddress(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Token issue error: {0}")]
    TokenIssue(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<ChallengeStoreError> for AuthError {
    fn from(e: ChallengeStoreError) -> Self {
        match e {
            ChallengeStoreError::NotFound(address) => AuthError::ChallengeNotFound(address),
            ChallengeStoreError::Internal(message) => AuthError::Storage(message),
        }
    }
}

impl From<AccountStoreError> for AuthError {
    fn from(e: AccountStoreError) -> Self {
        match e {
            AccountStoreError::Duplicate(email) => AuthError::AccountExists(email),
            AccountStoreError::Internal(message) => AuthError::Storage(message),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::Hashing(e.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::EncodingFailed(message) => AuthError::TokenIssue(message),
            JwtError::TokenExpired => AuthError::TokenExpired,
            JwtError::InvalidToken(message) => AuthError::InvalidToken(message),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidAddress(_) | AuthError::Validation(_) => {
                ApiError::validation(e.to_string())
            }
            AuthError::ChallengeNotFound(_) | AuthError::UnknownAddress(_) => {
                ApiError::Unauthorized("No challenge issued for this address".to_string())
            }
            AuthError::InvalidSignature => ApiError::Unauthorized("Invalid signature".to_string()),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::TokenExpired => ApiError::Unauthorized("Token has expired".to_string()),
            AuthError::InvalidToken(_) => ApiError::Unauthorized("Invalid token".to_string()),
            AuthError::AccountExists(_) => {
                ApiError::Conflict("An account with this email already exists".to_string())
            }
            AuthError::Storage(_)
            | AuthError::Hashing(_)
            | AuthError::TokenIssue(_)
            | AuthError::Configuration(_) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    challenges: Arc<dyn ChallengeStore>,
    accounts: Arc<dyn AccountStore>,
    tokens: TokenIssuer,
    challenge_ttl_seconds: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        challenges: Arc<dyn ChallengeStore>,
        accounts: Arc<dyn AccountStore>,
        tokens: TokenIssuer,
        challenge_ttl_seconds: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            challenges,
            accounts,
            tokens,
            challenge_ttl_seconds,
            bcrypt_cost,
        }
    }

    pub fn from_config(
        config: &Config,
        challenges: Arc<dyn ChallengeStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self::new(
            challenges,
            accounts,
            TokenIssuer::new(&config.jwt_secret, config.jwt_ttl_seconds),
            config.challenge_ttl_seconds,
            config.bcrypt_cost,
        )
    }

    /// Issue a fresh challenge for `address`, replacing any outstanding one
    pub async fn issue_challenge(&self, address: &str) -> Result<ChallengeRecord, AuthError> {
        let address = WalletAddress::parse(address)?;
        let issued_at = Utc::now();
        let expires_at = Duration::try_seconds(self.challenge_ttl_seconds)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::Configuration(format!(
                    "challenge lifetime of {}s is out of range",
                    self.challenge_ttl_seconds
                ))
            })?;

        let record = ChallengeRecord {
            message: generate_challenge_message(&address, issued_at),
            address,
            issued_at,
            expires_at,
        };
        self.challenges.upsert_challenge(&record).await?;

        tracing::info!(address = %record.address, expires_at = %record.expires_at, "Challenge issued");

        Ok(record)
    }

    /// Verify a signature over the outstanding challenge and issue a token
    ///
    /// The challenge is consumed on success, so a signature can be redeemed
    /// only once. A concurrent request that loses the race for the same
    /// challenge is rejected like a bad signature.
    pub async fn verify_wallet(
        &self,
        address: &str,
        signature: &str,
    ) -> Result<IssuedToken, AuthError> {
        let address = WalletAddress::parse(address).map_err(|e| {
            tracing::debug!(error = %e, "Verification for malformed address");
            AuthError::UnknownAddress(address.to_string())
        })?;
        let now = Utc::now();

        let challenge = self.challenges.get_challenge(&address, now).await?;

        if !verify_wallet_signature(signature, address.as_str(), &challenge.message) {
            tracing::warn!(address = %address, "Wallet signature rejected");
            return Err(AuthError::InvalidSignature);
        }

        self.challenges
            .consume_challenge(&address, &challenge.message, now)
            .await
            .map_err(|e| match e {
                ChallengeStoreError::NotFound(_) => AuthError::InvalidSignature,
                e => e.into(),
            })?;

        let issued = self.tokens.issue(address.as_str(), AuthMethod::Wallet)?;
        tracing::info!(address = %address, jti = %issued.claims.jti, "Wallet authenticated");

        Ok(issued)
    }

    /// Register a password account
    pub async fn signup(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = normalize_email(email);
        if !validator::validate_email(email.as_str()) {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let password_hash = hash_password(password.to_string(), self.bcrypt_cost).await?;
        let account = self
            .accounts
            .create_account(&NewAccount {
                email,
                password_hash,
            })
            .await?;

        tracing::info!(account_id = %account.id, "Account created");

        Ok(account)
    }

    /// Check a password and issue a token for the account
    pub async fn signin(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let email = normalize_email(email);

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            tracing::debug!("Signin for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), account.password_hash.clone()).await? {
            tracing::warn!(account_id = %account.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.tokens.issue(&account.email, AuthMethod::Password)?;
        tracing::info!(account_id = %account.id, jti = %issued.claims.jti, "Account signed in");

        Ok(issued)
    }

    /// Validate a bearer token, returning its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.tokens.verify(token)
    }

    /// Drop challenges whose TTL has passed
    pub async fn purge_expired_challenges(&self) -> Result<u64, AuthError> {
        Ok(self.challenges.cleanup_expired(Utc::now()).await?)
    }
}
