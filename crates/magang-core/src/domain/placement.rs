// ============================================================================
// Magang Core - Placement Entity
// File: crates/magang-core/src/domain/placement.rs
// Description: Participant / supervisor / company binding
// ============================================================================

use magang_shared::{Lifecycle, Timestamps};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placement entity.
///
/// Holds references only; a participant has at most one active placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub supervisor_id: Uuid,
    pub company_id: Uuid,
    pub lifecycle: Lifecycle,
    pub timestamps: Timestamps,
}

impl Placement {
    pub fn new(participant_id: Uuid, supervisor_id: Uuid, company_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            participant_id,
            supervisor_id,
            company_id,
            lifecycle: Lifecycle::Active,
            timestamps: Timestamps::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    pub fn reassign(&mut self, participant_id: Uuid, supervisor_id: Uuid, company_id: Uuid) {
        self.participant_id = participant_id;
        self.supervisor_id = supervisor_id;
        self.company_id = company_id;
        self.timestamps.touch();
    }
}
