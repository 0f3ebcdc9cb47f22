//! Dashboard counters per role

use std::sync::Arc;
use serde::Serialize;
use uuid::Uuid;

use crate::authorization::{require, Operation};
use crate::domain::{AccountStatus, Identity, LogbookScope, Role, StatusCounts};
use crate::error::DomainError;
use crate::repositories::{CompanyRepository, LogbookRepository, PlacementRepository, UserRepository};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsersByRole {
    pub admin: i64,
    pub supervisor: i64,
    pub participant: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub users: UsersByRole,
    pub companies: i64,
    pub active_placements: i64,
    pub logbook: StatusCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupervisorStats {
    pub participants: i64,
    pub logbook: StatusCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantStats {
    pub account_status: AccountStatus,
    pub company_id: Option<Uuid>,
    pub logbook: StatusCounts,
}

pub struct StatsService {
    users: Arc<dyn UserRepository>,
    companies: Arc<dyn CompanyRepository>,
    placements: Arc<dyn PlacementRepository>,
    entries: Arc<dyn LogbookRepository>,
}

impl StatsService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        companies: Arc<dyn CompanyRepository>,
        placements: Arc<dyn PlacementRepository>,
        entries: Arc<dyn LogbookRepository>,
    ) -> Self {
        Self { users, companies, placements, entries }
    }

    pub async fn admin(&self, caller: &Identity) -> Result<AdminStats, DomainError> {
        require(caller, Operation::AdminStats)?;

        let mut users = UsersByRole::default();
        for (role, n) in self.users.count_by_role().await? {
            match role {
                Role::Admin => users.admin += n,
                Role::Supervisor => users.supervisor += n,
                Role::Participant => users.participant += n,
            }
        }

        Ok(AdminStats {
            users,
            companies: self.companies.count().await?,
            active_placements: self.placements.count_active().await?,
            logbook: self.entries.count_by_status(LogbookScope::All).await?,
        })
    }

    pub async fn supervisor(&self, caller: &Identity) -> Result<SupervisorStats, DomainError> {
        require(caller, Operation::SupervisorStats)?;
        let placed = self.placements.list(Some(caller.user_id)).await?;

        Ok(SupervisorStats {
            participants: placed.len() as i64,
            logbook: self.entries.count_by_status(LogbookScope::Supervisor(caller.user_id)).await?,
        })
    }

    pub async fn participant(&self, caller: &Identity) -> Result<ParticipantStats, DomainError> {
        require(caller, Operation::ParticipantStats)?;
        let user = self
            .users
            .find_by_id(&caller.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", &caller.user_id))?;

        Ok(ParticipantStats {
            account_status: user.status,
            company_id: user.company_id,
            logbook: self.entries.count_by_status(LogbookScope::Owner(user.id)).await?,
        })
    }
}
