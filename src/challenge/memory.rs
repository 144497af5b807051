use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::store::{ChallengeRecord, ChallengeStore, ChallengeStoreError};
use crate::auth::WalletAddress;

/// Process-local challenge store
#[derive(Clone, Default)]
pub struct InMemoryChallengeStore {
    records: Arc<RwLock<HashMap<WalletAddress, ChallengeRecord>>>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held, expired ones included
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn upsert_challenge(&self, record: &ChallengeRecord) -> Result<(), ChallengeStoreError> {
        self.records
            .write()
            .await
            .insert(record.address.clone(), record.clone());
        Ok(())
    }

    async fn get_challenge(
        &self,
        address: &WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<ChallengeRecord, ChallengeStoreError> {
        self.records
            .read()
            .await
            .get(address)
            .filter(|record| !record.is_expired(now))
            .cloned()
            .ok_or_else(|| ChallengeStoreError::NotFound(address.clone()))
    }

    async fn consume_challenge(
        &self,
        address: &WalletAddress,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ChallengeStoreError> {
        let mut records = self.records.write().await;

        let live = records
            .get(address)
            .is_some_and(|record| record.message == message && !record.is_expired(now));
        if !live {
            return Err(ChallengeStoreError::NotFound(address.clone()));
        }

        records.remove(address);
        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, ChallengeStoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        Ok((before - records.len()) as u64)
    }
}
