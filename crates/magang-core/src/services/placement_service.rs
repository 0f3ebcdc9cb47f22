// ============================================================================
// Magang Core - Placement Service
// File: crates/magang-core/src/services/placement_service.rs
// ============================================================================
//! Participant / supervisor / company binding and its single-placement rule

use std::sync::Arc;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::authorization::{require, Operation};
use crate::domain::{Identity, Placement, Role};
use crate::error::{AuthzError, ConflictError, DomainError, ValidationError};
use crate::repositories::{CompanyRepository, PlacementRepository, UserRepository};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlacementInput {
    #[serde(alias = "user_id")]
    pub participant_id: Uuid,
    pub supervisor_id: Uuid,
    pub company_id: Uuid,
}

pub struct PlacementService {
    placements: Arc<dyn PlacementRepository>,
    users: Arc<dyn UserRepository>,
    companies: Arc<dyn CompanyRepository>,
}

impl PlacementService {
    pub fn new(
        placements: Arc<dyn PlacementRepository>,
        users: Arc<dyn UserRepository>,
        companies: Arc<dyn CompanyRepository>,
    ) -> Self {
        Self { placements, users, companies }
    }

    /// Admins see every active placement, supervisors only their own.
    pub async fn list(&self, caller: &Identity) -> Result<Vec<Placement>, DomainError> {
        require(caller, Operation::ReadPlacements)?;
        let scope = match caller.role {
            Role::Supervisor => Some(caller.user_id),
            _ => None,
        };
        self.placements.list(scope).await
    }

    pub async fn get(&self, caller: &Identity, id: &Uuid) -> Result<Placement, DomainError> {
        require(caller, Operation::ReadPlacements)?;
        let placement = self
            .placements
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("placement", id))?;

        if caller.role == Role::Supervisor && placement.supervisor_id != caller.user_id {
            return Err(AuthzError::Forbidden("placement belongs to another supervisor".into()).into());
        }
        Ok(placement)
    }

    /// The participant's own active placement, if any.
    pub async fn mine(&self, caller: &Identity) -> Result<Option<Placement>, DomainError> {
        require(caller, Operation::ReadOwnPlacement)?;
        self.placements.find_active_by_participant(&caller.user_id).await
    }

    pub async fn create(&self, caller: &Identity, input: PlacementInput) -> Result<Placement, DomainError> {
        require(caller, Operation::ManagePlacements)?;
        self.check_references(&input).await?;

        if self
            .placements
            .find_active_by_participant(&input.participant_id)
            .await?
            .is_some()
        {
            warn!("Participant {} already has an active placement", input.participant_id);
            return Err(ConflictError::AlreadyPlaced(input.participant_id).into());
        }

        let placement = Placement::new(input.participant_id, input.supervisor_id, input.company_id);
        let created = self.placements.create(&placement).await?;

        info!(
            "Placement {} created: participant {} under supervisor {} at company {}",
            created.id, created.participant_id, created.supervisor_id, created.company_id
        );
        Ok(created)
    }

    pub async fn update(
        &self,
        caller: &Identity,
        id: &Uuid,
        input: PlacementInput,
    ) -> Result<Placement, DomainError> {
        require(caller, Operation::ManagePlacements)?;
        let mut placement = self
            .placements
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("placement", id))?;
        self.check_references(&input).await?;

        if input.participant_id != placement.participant_id {
            if let Some(existing) = self
                .placements
                .find_active_by_participant(&input.participant_id)
                .await?
            {
                if existing.id != placement.id {
                    return Err(ConflictError::AlreadyPlaced(input.participant_id).into());
                }
            }
        }

        placement.reassign(input.participant_id, input.supervisor_id, input.company_id);
        let updated = self.placements.update(&placement).await?;

        info!("Placement {} updated", updated.id);
        Ok(updated)
    }

    pub async fn remove(&self, caller: &Identity, id: &Uuid) -> Result<Placement, DomainError> {
        require(caller, Operation::ManagePlacements)?;
        if self.placements.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found("placement", id));
        }

        let removed = self.placements.remove(id, Utc::now()).await?;
        info!(
            "Placement {} removed; participant {} locked",
            removed.id, removed.participant_id
        );
        Ok(removed)
    }

    /// Supervisor of the participant's active placement.
    pub async fn resolve_supervisor(&self, participant_id: &Uuid) -> Result<Option<Uuid>, DomainError> {
        Ok(self
            .placements
            .find_active_by_participant(participant_id)
            .await?
            .map(|p| p.supervisor_id))
    }

    async fn check_references(&self, input: &PlacementInput) -> Result<(), DomainError> {
        let participant = self
            .users
            .find_by_id(&input.participant_id)
            .await?
            .ok_or_else(|| DomainError::not_found("participant", &input.participant_id))?;
        if participant.role != Role::Participant {
            return Err(ValidationError::InvalidRole(format!(
                "{} is not a participant",
                participant.username
            ))
            .into());
        }

        let supervisor = self
            .users
            .find_by_id(&input.supervisor_id)
            .await?
            .ok_or_else(|| DomainError::not_found("supervisor", &input.supervisor_id))?;
        if supervisor.role != Role::Supervisor {
            return Err(ValidationError::InvalidRole(format!(
                "{} is not a supervisor",
                supervisor.username
            ))
            .into());
        }

        if self.companies.find_by_id(&input.company_id).await?.is_none() {
            return Err(DomainError::not_found("company", &input.company_id));
        }
        Ok(())
    }
}
