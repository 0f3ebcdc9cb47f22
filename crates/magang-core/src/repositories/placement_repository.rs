//! Placement repository trait (port)
//!
//! Writes that touch both the placement and the participant's account are a
//! single unit of work: implementations must apply both or neither.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::Placement;
use crate::error::DomainError;

#[async_trait]
pub trait PlacementRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Placement>, DomainError>;
    async fn find_active_by_participant(&self, participant_id: &Uuid) -> Result<Option<Placement>, DomainError>;
    /// All active placements, or only those of one supervisor.
    async fn list(&self, supervisor_id: Option<Uuid>) -> Result<Vec<Placement>, DomainError>;
    /// Inserts the placement, then marks the participant active and stamps
    /// the company. Fails with `AlreadyPlaced` if the participant is placed.
    async fn create(&self, placement: &Placement) -> Result<Placement, DomainError>;
    /// Saves a changed placement. A changed participant is released and the
    /// new one activated; the (new) participant's company is re-stamped.
    async fn update(&self, placement: &Placement) -> Result<Placement, DomainError>;
    /// Soft-deletes the placement and releases its participant.
    async fn remove(&self, id: &Uuid, at: DateTime<Utc>) -> Result<Placement, DomainError>;
    async fn count_active(&self) -> Result<i64, DomainError>;
}
