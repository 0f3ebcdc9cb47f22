//! Uploaded file storage (port)

use async_trait::async_trait;
use crate::domain::UploadKind;
use crate::error::DomainError;

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persists already-validated bytes under a generated, collision-resistant
    /// name and returns the public reference to store on the entity.
    async fn store(&self, kind: UploadKind, extension: &str, bytes: Vec<u8>) -> Result<String, DomainError>;
    async fn remove(&self, reference: &str) -> Result<(), DomainError>;
}
