//! Logbook repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::{LogbookEntry, LogbookScope, StatusCounts};
use crate::error::DomainError;

#[async_trait]
pub trait LogbookRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<LogbookEntry>, DomainError>;
    /// Non-deleted entries in scope, newest activity date first.
    async fn list(&self, scope: LogbookScope) -> Result<Vec<LogbookEntry>, DomainError>;
    async fn create(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError>;
    /// Writes date, description, evidence and attendance, never the status.
    /// Only a still-pending entry is changed; otherwise `EntryLocked`.
    async fn update_content(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError>;
    /// Writes the review status alone.
    async fn set_status(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError>;
    async fn soft_delete(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
    async fn count_by_status(&self, scope: LogbookScope) -> Result<StatusCounts, DomainError>;
}
