//! Role permission matrix and ownership checks
//!
//! Every service operation names the [`Operation`] it performs and asks
//! [`require`] once before touching storage. Resource-level rules (owning a
//! logbook entry, supervising its author) are checked by the services on top.

use tracing::warn;
use uuid::Uuid;

use crate::domain::{Identity, Role};
use crate::error::AuthzError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ViewOwnProfile,
    EditOwnProfile,
    ManageUsers,
    ReadCompanies,
    ManageCompanies,
    ReadPlacements,
    ReadOwnPlacement,
    ManagePlacements,
    SubmitLogbook,
    EditOwnLogbook,
    ReadOwnLogbook,
    ReadSupervisedLogbook,
    ReadAllLogbook,
    ReadLogbookEntry,
    SetLogbookStatus,
    DeleteLogbook,
    AdminStats,
    SupervisorStats,
    ParticipantStats,
}

const ANYONE: &[Role] = &[Role::Admin, Role::Supervisor, Role::Participant];
const ADMIN: &[Role] = &[Role::Admin];
const STAFF: &[Role] = &[Role::Admin, Role::Supervisor];
const SUPERVISOR: &[Role] = &[Role::Supervisor];
const PARTICIPANT: &[Role] = &[Role::Participant];
const ADMIN_OR_PARTICIPANT: &[Role] = &[Role::Admin, Role::Participant];

/// Role x operation table. Each operation appears exactly once.
pub const PERMISSIONS: &[(Operation, &[Role])] = &[
    (Operation::ViewOwnProfile, ANYONE),
    (Operation::EditOwnProfile, ANYONE),
    (Operation::ManageUsers, ADMIN),
    (Operation::ReadCompanies, STAFF),
    (Operation::ManageCompanies, ADMIN),
    (Operation::ReadPlacements, STAFF),
    (Operation::ReadOwnPlacement, PARTICIPANT),
    (Operation::ManagePlacements, ADMIN),
    (Operation::SubmitLogbook, PARTICIPANT),
    (Operation::EditOwnLogbook, PARTICIPANT),
    (Operation::ReadOwnLogbook, PARTICIPANT),
    (Operation::ReadSupervisedLogbook, SUPERVISOR),
    (Operation::ReadAllLogbook, ADMIN),
    (Operation::ReadLogbookEntry, ANYONE),
    (Operation::SetLogbookStatus, STAFF),
    (Operation::DeleteLogbook, ADMIN_OR_PARTICIPANT),
    (Operation::AdminStats, ADMIN),
    (Operation::SupervisorStats, SUPERVISOR),
    (Operation::ParticipantStats, PARTICIPANT),
];

pub fn allowed_roles(operation: Operation) -> &'static [Role] {
    PERMISSIONS
        .iter()
        .find(|(op, _)| *op == operation)
        .map(|(_, roles)| *roles)
        .unwrap_or(&[])
}

/// Checks the matrix for a possibly anonymous caller.
pub fn authorize(identity: Option<&Identity>, operation: Operation) -> Result<&Identity, AuthzError> {
    let identity = identity.ok_or(AuthzError::Unauthenticated)?;

    if allowed_roles(operation).contains(&identity.role) {
        Ok(identity)
    } else {
        warn!(
            "Role {} denied {:?} for user {}",
            identity.role.as_str(),
            operation,
            identity.user_id
        );
        Err(AuthzError::Forbidden(format!(
            "role {} may not perform this action",
            identity.role.as_str()
        )))
    }
}

pub fn require(identity: &Identity, operation: Operation) -> Result<(), AuthzError> {
    authorize(Some(identity), operation).map(|_| ())
}

/// The caller must be the owner of the resource.
pub fn ensure_owner(identity: &Identity, owner_id: &Uuid) -> Result<(), AuthzError> {
    if identity.is(owner_id) {
        Ok(())
    } else {
        warn!("User {} is not the owner of the resource", identity.user_id);
        Err(AuthzError::Forbidden("not the owner of this resource".into()))
    }
}
