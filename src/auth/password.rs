//! Password hashing
//!
//! bcrypt is deliberately slow, so hashing and verification run on the
//! blocking thread pool instead of an async worker.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Password hashing task failed: {0}")]
    Task(String),
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Returns `Ok(false)` for a mismatch and for a stored hash bcrypt cannot parse
pub async fn verify_password(password: String, hash: String) -> Result<bool, PasswordError> {
    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?;

    match matched {
        Ok(matched) => Ok(matched),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            Ok(false)
        }
    }
}
