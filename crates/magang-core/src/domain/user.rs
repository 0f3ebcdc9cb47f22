// ============================================================================
// Magang Core - User Entity
// File: crates/magang-core/src/domain/user.rs
// Description: Admin, supervisor, and participant accounts
// ============================================================================

use chrono::{DateTime, Utc};
use magang_shared::{Lifecycle, Timestamps};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::ValidationError;

/// Role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(alias = "pembimbing")]
    Supervisor,
    #[serde(alias = "peserta")]
    Participant,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Supervisor, Role::Participant];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Participant => "participant",
        }
    }

    /// Accepts the English names and the Indonesian ones used in older clients.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "supervisor" | "pembimbing" => Some(Role::Supervisor),
            "participant" | "peserta" => Some(Role::Participant),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::from_str(s).ok_or_else(|| ValidationError::InvalidRole(s.to_string()))
    }
}

/// Report-submission eligibility of an account.
///
/// Participants are `Locked` until they hold an active placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Locked,
    Active,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Locked => "locked",
            AccountStatus::Active => "active",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "locked" | "terkunci" => Some(AccountStatus::Locked),
            "active" | "aktif" => Some(AccountStatus::Active),
            _ => None,
        }
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        AccountStatus::Locked
    }
}

/// Participant-only enrollment metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Enrollment {
    #[validate(length(max = 30, message = "Student id is too long"))]
    pub student_id: Option<String>,
    #[validate(length(max = 100, message = "Department is too long"))]
    pub department: Option<String>,
    #[validate(length(max = 20, message = "Phone is too long"))]
    pub phone: Option<String>,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,

    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,
    pub photo: Option<String>,

    #[validate(nested)]
    pub enrollment: Enrollment,

    pub company_id: Option<Uuid>,
    pub status: AccountStatus,
    pub last_login_at: Option<DateTime<Utc>>,

    pub lifecycle: Lifecycle,
    pub timestamps: Timestamps,
}

impl User {
    pub fn new(
        full_name: String,
        username: String,
        password_hash: String,
        role: Role,
        enrollment: Enrollment,
    ) -> Result<Self, validator::ValidationErrors> {
        let enrollment = match role {
            Role::Participant => enrollment,
            _ => Enrollment::default(),
        };
        let user = Self {
            id: Uuid::new_v4(),
            full_name,
            username,
            password_hash,
            role,
            photo: None,
            enrollment,
            company_id: None,
            status: AccountStatus::Locked,
            last_login_at: None,
            lifecycle: Lifecycle::Active,
            timestamps: Timestamps::now(),
        };

        user.validate()?;
        Ok(user)
    }

    pub fn is_participant(&self) -> bool {
        self.role == Role::Participant
    }

    pub fn can_submit_reports(&self) -> bool {
        self.is_participant() && self.status == AccountStatus::Active
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
    }

    pub fn is_deleted(&self) -> bool {
        self.lifecycle.is_deleted()
    }
}
