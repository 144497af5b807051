use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::store::{ChallengeRecord, ChallengeStore, ChallengeStoreError};
use crate::auth::WalletAddress;

/// Challenge store backed by the `wallet_challenges` table
#[derive(Clone)]
pub struct PgChallengeStore {
    db_pool: PgPool,
}

impl PgChallengeStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[derive(sqlx::FromRow)]
struct ChallengeRow {
    address: String,
    message: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<ChallengeRow> for ChallengeRecord {
    type Error = ChallengeStoreError;

    fn try_from(row: ChallengeRow) -> Result<Self, Self::Error> {
        let address = WalletAddress::parse(&row.address).map_err(|e| {
            ChallengeStoreError::Internal(format!("corrupt address '{}': {}", row.address, e))
        })?;

        Ok(ChallengeRecord {
            address,
            message: row.message,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
        })
    }
}

#[async_trait]
impl ChallengeStore for PgChallengeStore {
    async fn upsert_challenge(&self, record: &ChallengeRecord) -> Result<(), ChallengeStoreError> {
        sqlx::query(
            r#"
            INSERT INTO wallet_challenges (address, message, issued_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (address) DO UPDATE
                SET message    = excluded.message,
                    issued_at  = excluded.issued_at,
                    expires_at = excluded.expires_at
            "#,
        )
        .bind(record.address.as_str())
        .bind(&record.message)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    async fn get_challenge(
        &self,
        address: &WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<ChallengeRecord, ChallengeStoreError> {
        let row: Option<ChallengeRow> = sqlx::query_as(
            r#"
            SELECT address, message, issued_at, expires_at
            FROM wallet_challenges
            WHERE address = $1 AND expires_at > $2
            "#,
        )
        .bind(address.as_str())
        .bind(now)
        .fetch_optional(&self.db_pool)
        .await?;

        row.ok_or_else(|| ChallengeStoreError::NotFound(address.clone()))?
            .try_into()
    }

    async fn consume_challenge(
        &self,
        address: &WalletAddress,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ChallengeStoreError> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM wallet_challenges
            WHERE address = $1 AND message = $2 AND expires_at > $3
            "#,
        )
        .bind(address.as_str())
        .bind(message)
        .bind(now)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        // Another request consumed or rotated it first
        if rows_affected == 0 {
            return Err(ChallengeStoreError::NotFound(address.clone()));
        }

        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> Result<u64, ChallengeStoreError> {
        let rows_affected = sqlx::query("DELETE FROM wallet_challenges WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.db_pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/car_inventory_test".to_string());

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");
        crate::db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_upsert_then_consume() {
        let store = PgChallengeStore::new(setup_test_db().await);
        let address = WalletAddress::parse("0x2c7536e3605d9c16a7a3d7b1898e529396a65c23").unwrap();
        let now = Utc::now();

        for message in ["first", "second"] {
            store
                .upsert_challenge(&ChallengeRecord {
                    address: address.clone(),
                    message: message.to_string(),
                    issued_at: now,
                    expires_at: now + Duration::seconds(300),
                })
                .await
                .unwrap();
        }

        let current = store.get_challenge(&address, now).await.unwrap();
        assert_eq!(current.message, "second");

        store.consume_challenge(&address, "second", now).await.unwrap();
        assert!(matches!(
            store.get_challenge(&address, now).await,
            Err(ChallengeStoreError::NotFound(_))
        ));
    }
}
