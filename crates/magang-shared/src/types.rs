//! Common types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Soft-delete lifecycle of a persisted entity.
///
/// Rows are never hard-deleted; a deleted row keeps the moment it was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Lifecycle {
    Active,
    Deleted { at: DateTime<Utc> },
}

impl Lifecycle {
    /// Maps the nullable `removed_at` column onto the lifecycle tag.
    pub fn from_removed_at(removed_at: Option<DateTime<Utc>>) -> Self {
        match removed_at {
            Some(at) => Lifecycle::Deleted { at },
            None => Lifecycle::Active,
        }
    }

    pub fn removed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Active => None,
            Lifecycle::Deleted { at } => Some(*at),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Lifecycle::Active)
    }

    pub fn is_deleted(&self) -> bool {
        !self.is_active()
    }

    /// Marks the entity deleted. Deleting twice keeps the first timestamp.
    pub fn delete(&mut self, at: DateTime<Utc>) {
        if self.is_active() {
            *self = Lifecycle::Deleted { at };
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn now() -> Self {
        let now = Utc::now();
        Self { created_at: now, updated_at: now }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::now()
    }
}
