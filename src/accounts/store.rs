use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Account, NewAccount};

#[derive(Error, Debug)]
pub enum AccountStoreError {
    #[error("An account with email {0} already exists")]
    Duplicate(String),

    #[error("Account storage failure: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AccountStoreError {
    fn from(e: sqlx::Error) -> Self {
        AccountStoreError::Internal(e.to_string())
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account; emails are unique
    async fn create_account(&self, account: &NewAccount) -> Result<Account, AccountStoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountStoreError>;
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Clone)]
pub struct PgAccountStore {
    db_pool: PgPool,
}

impl PgAccountStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create_account(&self, account: &NewAccount) -> Result<Account, AccountStoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AccountStoreError::Duplicate(account.email.clone())
            }
            e => e.into(),
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountStoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, email, password_hash, created_at FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(account)
    }
}

////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create_account(&self, account: &NewAccount) -> Result<Account, AccountStoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.email) {
            return Err(AccountStoreError::Duplicate(account.email.clone()));
        }

        let created = Account {
            id: Uuid::new_v4(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            created_at: Utc::now(),
        };
        accounts.insert(created.email.clone(), created.clone());

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountStoreError> {
        Ok(self.accounts.read().await.get(email).cloned())
    }
}
