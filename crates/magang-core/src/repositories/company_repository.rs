//! Company repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::Company;
use crate::error::DomainError;

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, DomainError>;
    async fn list(&self) -> Result<Vec<Company>, DomainError>;
    async fn create(&self, company: &Company) -> Result<Company, DomainError>;
    async fn update(&self, company: &Company) -> Result<Company, DomainError>;
    /// Soft-deletes the company unless an active placement still refers to
    /// it (`CompanyInUse`). The check and the write are one unit of work.
    async fn soft_delete(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
    async fn count(&self) -> Result<i64, DomainError>;
}
