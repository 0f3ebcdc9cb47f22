//! Company management

use std::sync::Arc;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use magang_shared::utils::non_blank;

use crate::authorization::{require, Operation};
use crate::domain::{Company, Identity};
use crate::error::{ConflictError, DomainError};
use crate::repositories::CompanyRepository;

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyInput {
    #[serde(alias = "nama")]
    pub name: String,
    #[serde(alias = "alamat")]
    pub address: Option<String>,
    #[serde(alias = "kontak")]
    pub contact: Option<String>,
}

pub struct CompanyService {
    companies: Arc<dyn CompanyRepository>,
}

impl CompanyService {
    pub fn new(companies: Arc<dyn CompanyRepository>) -> Self {
        Self { companies }
    }

    pub async fn list(&self, caller: &Identity) -> Result<Vec<Company>, DomainError> {
        require(caller, Operation::ReadCompanies)?;
        self.companies.list().await
    }

    pub async fn get(&self, caller: &Identity, id: &Uuid) -> Result<Company, DomainError> {
        require(caller, Operation::ReadCompanies)?;
        self.find(id).await
    }

    pub async fn create(&self, caller: &Identity, input: CompanyInput) -> Result<Company, DomainError> {
        require(caller, Operation::ManageCompanies)?;
        let company = Company::new(input.name, non_blank(input.address), non_blank(input.contact))?;

        let created = self.companies.create(&company).await?;
        info!("Company {} created: {}", created.id, created.name);
        Ok(created)
    }

    pub async fn update(&self, caller: &Identity, id: &Uuid, input: CompanyInput) -> Result<Company, DomainError> {
        require(caller, Operation::ManageCompanies)?;
        let existing = self.find(id).await?;

        let mut company = Company::new(input.name, non_blank(input.address), non_blank(input.contact))?;
        company.id = existing.id;
        company.timestamps.created_at = existing.timestamps.created_at;

        self.companies.update(&company).await
    }

    /// Companies that still host an active placement cannot be removed.
    pub async fn delete(&self, caller: &Identity, id: &Uuid) -> Result<(), DomainError> {
        require(caller, Operation::ManageCompanies)?;
        self.find(id).await?;

        match self.companies.soft_delete(id, Utc::now()).await {
            Ok(()) => {
                info!("Company {} deleted", id);
                Ok(())
            }
            Err(e @ DomainError::Conflict(ConflictError::CompanyInUse(_))) => {
                warn!("Company {} still hosts active placements", id);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn find(&self, id: &Uuid) -> Result<Company, DomainError> {
        self.companies
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("company", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Placement, Role};
    use crate::error::AuthzError;
    use crate::repositories::PlacementRepository;
    use crate::testing::{identity_of, InMemoryStore};

    fn input(name: &str) -> CompanyInput {
        CompanyInput { name: name.into(), address: Some("Jl. Merdeka 1".into()), contact: Some(" ".into()) }
    }

    #[tokio::test]
    async fn test_crud_by_admin_read_by_supervisor() {
        let store = InMemoryStore::new();
        let admin = identity_of(&store.seed_user(Role::Admin, "admin"));
        let supervisor = identity_of(&store.seed_user(Role::Supervisor, "budi"));
        let companies = CompanyService::new(store.clone());

        let created = companies.create(&admin, input("PT Nusantara")).await.unwrap();
        assert_eq!(created.contact, None);

        let renamed = companies.update(&admin, &created.id, input("PT Nusantara Jaya")).await.unwrap();
        assert_eq!(renamed.id, created.id);
        assert_eq!(companies.get(&supervisor, &created.id).await.unwrap().name, "PT Nusantara Jaya");

        let err = companies.create(&supervisor, input("CV Lain")).await.unwrap_err();
        assert!(matches!(err, DomainError::Authz(AuthzError::Forbidden(_))));

        companies.delete(&admin, &created.id).await.unwrap();
        assert!(companies.list(&supervisor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_company_in_use_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let admin = identity_of(&store.seed_user(Role::Admin, "admin"));
        let participant = store.seed_user(Role::Participant, "amara");
        let supervisor = store.seed_user(Role::Supervisor, "budi");
        let company = store.seed_company("PT Nusantara");
        PlacementRepository::create(&*store, &Placement::new(participant.id, supervisor.id, company.id))
            .await
            .unwrap();

        let err = CompanyService::new(store.clone()).delete(&admin, &company.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ConflictError::CompanyInUse(_))));
    }

    /// Commits a placement at the company right before the delete lands.
    struct PlacedDuringDelete {
        inner: Arc<InMemoryStore>,
        placement: Placement,
    }

    #[async_trait::async_trait]
    impl CompanyRepository for PlacedDuringDelete {
        async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, DomainError> {
            CompanyRepository::find_by_id(&*self.inner, id).await
        }
        async fn list(&self) -> Result<Vec<Company>, DomainError> {
            CompanyRepository::list(&*self.inner).await
        }
        async fn create(&self, company: &Company) -> Result<Company, DomainError> {
            CompanyRepository::create(&*self.inner, company).await
        }
        async fn update(&self, company: &Company) -> Result<Company, DomainError> {
            CompanyRepository::update(&*self.inner, company).await
        }
        async fn soft_delete(&self, id: &Uuid, at: chrono::DateTime<Utc>) -> Result<(), DomainError> {
            PlacementRepository::create(&*self.inner, &self.placement).await?;
            CompanyRepository::soft_delete(&*self.inner, id, at).await
        }
        async fn count(&self) -> Result<i64, DomainError> {
            CompanyRepository::count(&*self.inner).await
        }
    }

    #[tokio::test]
    async fn test_delete_refuses_company_placed_concurrently() {
        let store = InMemoryStore::new();
        let admin = identity_of(&store.seed_user(Role::Admin, "admin"));
        let participant = store.seed_user(Role::Participant, "amara");
        let supervisor = store.seed_user(Role::Supervisor, "budi");
        let company = store.seed_company("PT Nusantara");
        let companies = CompanyService::new(Arc::new(PlacedDuringDelete {
            inner: store.clone(),
            placement: Placement::new(participant.id, supervisor.id, company.id),
        }));

        let err = companies.delete(&admin, &company.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ConflictError::CompanyInUse(_))));
        assert!(companies.get(&admin, &company.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_participant_cannot_read_companies() {
        let store = InMemoryStore::new();
        let participant = identity_of(&store.seed_user(Role::Participant, "amara"));
        assert!(CompanyService::new(store.clone()).list(&participant).await.is_err());
    }
}
