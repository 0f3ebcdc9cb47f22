//! User administration and self-service profile operations

use std::sync::Arc;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use magang_security::PasswordService;
use magang_shared::utils::{non_blank, normalize_username};

use crate::authorization::{require, Operation};
use crate::domain::{Enrollment, FileUpload, Identity, Placement, Role, UploadKind, UploadPolicy, User};
use crate::error::{AuthError, AuthzError, DomainError, ValidationError};
use crate::repositories::{FileStorage, PlacementRepository, UserRepository};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUserInput {
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
    pub role: Role,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: Option<String>,
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

/// The caller's own account plus, for participants, their active placement.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub placement: Option<Placement>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    placements: Arc<dyn PlacementRepository>,
    storage: Arc<dyn FileStorage>,
    policy: UploadPolicy,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        placements: Arc<dyn PlacementRepository>,
        storage: Arc<dyn FileStorage>,
        policy: UploadPolicy,
    ) -> Self {
        Self { users, placements, storage, policy }
    }

    pub async fn list(&self, caller: &Identity, role: Option<Role>) -> Result<Vec<User>, DomainError> {
        require(caller, Operation::ManageUsers)?;
        self.users.list(role).await
    }

    pub async fn get(&self, caller: &Identity, id: &Uuid) -> Result<User, DomainError> {
        require(caller, Operation::ManageUsers)?;
        self.find(id).await
    }

    pub async fn create(&self, caller: &Identity, input: NewUserInput) -> Result<User, DomainError> {
        require(caller, Operation::ManageUsers)?;
        input.validate()?;

        let username = normalize_username(&input.username);
        if self.users.find_by_username(&username).await?.is_some() {
            warn!("User creation failed: username already exists: {}", username);
            return Err(ValidationError::DuplicateUsername(username).into());
        }

        let password_hash = PasswordService::hash_blocking(input.password)
            .await
            .map_err(|e| DomainError::InternalError(e.to_string()))?;

        let user = User::new(
            input.full_name.trim().to_string(),
            username,
            password_hash,
            input.role,
            Enrollment {
                student_id: non_blank(input.student_id),
                department: non_blank(input.department),
                phone: non_blank(input.phone),
            },
        )?;

        let created = self.users.create(&user).await?;
        info!("User {} created with role {}", created.username, created.role.as_str());
        Ok(created)
    }

    pub async fn update(&self, caller: &Identity, id: &Uuid, input: UpdateUserInput) -> Result<User, DomainError> {
        require(caller, Operation::ManageUsers)?;
        input.validate()?;
        let mut user = self.find(id).await?;

        if let Some(username) = input.username.as_deref().map(normalize_username) {
            if username != user.username {
                if let Some(existing) = self.users.find_by_username(&username).await? {
                    if existing.id != user.id {
                        return Err(ValidationError::DuplicateUsername(username).into());
                    }
                }
                user.username = username;
            }
        }

        if let Some(role) = input.role {
            if role != user.role && self.takes_part_in_placement(&user).await? {
                return Err(ValidationError::Invalid(
                    "remove the user's placements before changing their role".into(),
                )
                .into());
            }
            user.role = role;
        }

        if let Some(full_name) = input.full_name {
            user.full_name = full_name.trim().to_string();
        }
        if let Some(password) = input.password {
            user.password_hash = PasswordService::hash_blocking(password)
                .await
                .map_err(|e| DomainError::InternalError(e.to_string()))?;
        }
        apply_enrollment(&mut user, input.student_id, input.department, input.phone);
        if user.role != Role::Participant {
            user.enrollment = Enrollment::default();
        }

        user.timestamps.touch();
        user.validate()?;
        let updated = self.users.update(&user).await?;
        info!("User {} updated", updated.id);
        Ok(updated)
    }

    /// Soft-deletes the account. Active placements it takes part in end with it.
    pub async fn delete(&self, caller: &Identity, id: &Uuid) -> Result<(), DomainError> {
        require(caller, Operation::ManageUsers)?;
        if caller.is(id) {
            return Err(AuthzError::Forbidden("administrators cannot delete themselves".into()).into());
        }
        self.find(id).await?;

        self.users.soft_delete(id, Utc::now()).await?;
        info!("User {} deleted by {}", id, caller.user_id);
        Ok(())
    }

    pub async fn profile(&self, caller: &Identity) -> Result<Profile, DomainError> {
        require(caller, Operation::ViewOwnProfile)?;
        let user = self.own_account(caller).await?;
        let placement = match user.role {
            Role::Participant => self.placements.find_active_by_participant(&user.id).await?,
            _ => None,
        };
        Ok(Profile { user, placement })
    }

    pub async fn update_profile(&self, caller: &Identity, input: ProfileUpdate) -> Result<User, DomainError> {
        require(caller, Operation::EditOwnProfile)?;
        input.validate()?;
        let mut user = self.own_account(caller).await?;

        if let Some(full_name) = input.full_name {
            user.full_name = full_name.trim().to_string();
        }
        if user.role == Role::Participant {
            apply_enrollment(&mut user, input.student_id, input.department, input.phone);
        }

        user.timestamps.touch();
        user.validate()?;
        self.users.update(&user).await
    }

    pub async fn change_password(
        &self,
        caller: &Identity,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        require(caller, Operation::EditOwnProfile)?;
        if new_password.len() < 6 || new_password.len() > 128 {
            return Err(ValidationError::Invalid("Password must be 6-128 characters".into()).into());
        }
        let mut user = self.own_account(caller).await?;

        let valid = PasswordService::verify_blocking(current_password.to_string(), user.password_hash.clone())
            .await
            .unwrap_or(false);
        if !valid {
            warn!("Password change rejected for {}: wrong current password", user.id);
            return Err(AuthError::InvalidCredential.into());
        }

        user.password_hash = PasswordService::hash_blocking(new_password.to_string())
            .await
            .map_err(|e| DomainError::InternalError(e.to_string()))?;
        user.timestamps.touch();
        self.users.update(&user).await?;

        info!("Password changed for {}", user.id);
        Ok(())
    }

    pub async fn update_photo(&self, caller: &Identity, upload: FileUpload) -> Result<User, DomainError> {
        require(caller, Operation::EditOwnProfile)?;
        let extension = self.policy.check(UploadKind::ProfilePhoto, &upload)?;
        let mut user = self.own_account(caller).await?;

        let reference = self
            .storage
            .store(UploadKind::ProfilePhoto, &extension, upload.bytes)
            .await?;
        let previous = user.photo.replace(reference.clone());
        user.timestamps.touch();

        let updated = match self.users.update(&user).await {
            Ok(updated) => updated,
            Err(e) => {
                let _ = self.storage.remove(&reference).await;
                return Err(e);
            }
        };
        if let Some(previous) = previous {
            if let Err(e) = self.storage.remove(&previous).await {
                warn!("Failed to remove old profile photo {}: {}", previous, e);
            }
        }
        Ok(updated)
    }

    async fn find(&self, id: &Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    async fn own_account(&self, caller: &Identity) -> Result<User, DomainError> {
        self.users
            .find_by_id(&caller.user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound.into())
    }

    async fn takes_part_in_placement(&self, user: &User) -> Result<bool, DomainError> {
        match user.role {
            Role::Participant => Ok(self.placements.find_active_by_participant(&user.id).await?.is_some()),
            Role::Supervisor => Ok(!self.placements.list(Some(user.id)).await?.is_empty()),
            Role::Admin => Ok(false),
        }
    }
}

/// `Some("")` clears a field, `None` leaves it untouched.
fn apply_enrollment(
    user: &mut User,
    student_id: Option<String>,
    department: Option<String>,
    phone: Option<String>,
) {
    if student_id.is_some() {
        user.enrollment.student_id = non_blank(student_id);
    }
    if department.is_some() {
        user.enrollment.department = non_blank(department);
    }
    if phone.is_some() {
        user.enrollment.phone = non_blank(phone);
    }
}
