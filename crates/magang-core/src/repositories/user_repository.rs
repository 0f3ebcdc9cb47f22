//! User repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::{Role, User};
use crate::error::DomainError;

/// Reads only ever return non-deleted users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, DomainError>;
    /// Fails with `DuplicateUsername` when the username is taken.
    async fn create(&self, user: &User) -> Result<User, DomainError>;
    /// Writes account and profile fields. The placement status and company
    /// are owned by the placement writes and are left as stored.
    async fn update(&self, user: &User) -> Result<User, DomainError>;
    async fn record_login(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
    /// Soft-deletes the user and, in the same transaction, every active
    /// placement they take part in, releasing the affected participants.
    async fn soft_delete(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>, DomainError>;
}
