use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A password account. The hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Account about to be inserted
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
}

/// Emails are unique case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
