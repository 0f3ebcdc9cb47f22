//! Resolved caller identity

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// Who is calling, as asserted by a verified session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
    pub name: String,
}

impl Identity {
    pub fn new(user_id: Uuid, role: Role, name: impl Into<String>) -> Self {
        Self { user_id, role, name: name.into() }
    }

    pub fn is(&self, user_id: &Uuid) -> bool {
        self.user_id == *user_id
    }
}
