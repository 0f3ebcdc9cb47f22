//! Domain errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("User not found")]
    NotFound,

    #[error("Invalid username or password")]
    InvalidCredential,

    #[error("Session expired")]
    Expired,

    #[error("Malformed session token")]
    Malformed,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("File type not allowed: {0}")]
    FileTypeRejected(String),

    #[error("File exceeds {limit} bytes")]
    FileTooLarge { limit: usize },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("Participant {0} already has an active placement")]
    AlreadyPlaced(Uuid),

    #[error("Company {0} still has active placements")]
    CompanyInUse(Uuid),

    #[error("Logbook entry {0} is no longer pending")]
    EntryLocked(Uuid),
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn not_found(what: &str, id: &Uuid) -> Self {
        DomainError::NotFound(format!("{} {}", what, id))
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let reason = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "invalid value".to_string());
                format!("{}: {}", field, reason)
            })
            .collect::<Vec<_>>()
            .join(", ");
        DomainError::Validation(ValidationError::Invalid(message))
    }
}
