use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::auth::WalletAddress;

/// The outstanding challenge for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeRecord {
    pub address: WalletAddress,
    pub message: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ChallengeRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Error, Debug)]
pub enum ChallengeStoreError {
    #[error("No challenge on record for {0}")]
    NotFound(WalletAddress),

    #[error("Challenge storage failure: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ChallengeStoreError {
    fn from(e: sqlx::Error) -> Self {
        ChallengeStoreError::Internal(e.to_string())
    }
}

/// Persistent address → challenge mapping
///
/// Every method is individually atomic. Sequencing issue → sign → submit is
/// up to the client.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Create the record, or replace the one already held for the address
    async fn upsert_challenge(&self, record: &ChallengeRecord) -> Result<(), ChallengeStoreError>;

    /// Fetch the live (unexpired) challenge for `address`
    async fn get_challenge(
        &self,
        address: &WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<ChallengeRecord, ChallengeStoreError>;

    /// Delete the record iff it still holds `message` and has not expired
    async fn consume_challenge(
        &self,
        address: &WalletAddress,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ChallengeStoreError>;

    /// Delete every expired record, returning how many were removed
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, ChallengeStoreError>;
}
