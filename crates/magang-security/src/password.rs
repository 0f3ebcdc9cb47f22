//! Password hashing with bcrypt

use magang_shared::constants::BCRYPT_COST;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Hash error: {0}")]
    HashError(String),
    #[error("Stored hash is not a bcrypt hash")]
    InvalidHash,
}

pub struct PasswordService;

impl PasswordService {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        bcrypt::hash(password, BCRYPT_COST).map_err(|e| PasswordError::HashError(e.to_string()))
    }

    /// Verifies against a bcrypt hash. Anything that is not a bcrypt hash never matches.
    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        if !hash.starts_with("$2") {
            return Err(PasswordError::InvalidHash);
        }
        bcrypt::verify(password, hash).map_err(|_| PasswordError::InvalidHash)
    }

    /// Hashing is CPU bound; run it off the async workers.
    pub async fn hash_blocking(password: String) -> Result<String, PasswordError> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| PasswordError::HashError(e.to_string()))?
    }

    pub async fn verify_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::HashError(e.to_string()))?
    }
}
