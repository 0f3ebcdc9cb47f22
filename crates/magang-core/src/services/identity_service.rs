// ============================================================================
// Magang Core - Identity Service
// File: crates/magang-core/src/services/identity_service.rs
// ============================================================================
//! Credential verification, session issuance and registration

use std::sync::Arc;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn, error};
use validator::Validate;

use magang_security::{JwtError, JwtService, PasswordService};
use magang_shared::utils::{non_blank, normalize_username};

use crate::domain::{Enrollment, Identity, Role, User};
use crate::error::{AuthError, DomainError, ValidationError};
use crate::repositories::UserRepository;

/// Identity service: turns credentials into session tokens and tokens into identities
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    /// Login with username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<LoginResult, DomainError> {
        let username = normalize_username(username);
        if username.is_empty() {
            return Err(ValidationError::MissingField("username".into()).into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password".into()).into());
        }

        info!("Login attempt for username: {}", username);

        // 1. Find user among non-deleted accounts
        let user = self.users.find_by_username(&username).await?.ok_or_else(|| {
            warn!("Login failed: username not found: {}", username);
            AuthError::NotFound
        })?;

        // 2. Verify password against the bcrypt hash only
        let valid = PasswordService::verify_blocking(password.to_string(), user.password_hash.clone())
            .await
            .unwrap_or_else(|e| {
                warn!("Stored credential for {} is unusable: {}", username, e);
                false
            });

        if !valid {
            warn!("Login failed: invalid password for: {}", username);
            return Err(AuthError::InvalidCredential.into());
        }

        // 3. Issue session token
        let token = self
            .jwt
            .issue(&user.id, user.role.as_str(), &user.full_name)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;

        // 4. Update last login
        let mut user = user;
        user.record_login();
        if let Err(e) = self.users.record_login(&user.id, Utc::now()).await {
            error!("Failed to update last login: {}", e);
        }

        info!("Login successful for: {}", username);

        Ok(LoginResult {
            token,
            expires_in: self.jwt.session_ttl_seconds(),
            user,
        })
    }

    /// Resolves a presented session token into the caller's identity
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.jwt.verify(token).map_err(|e| match e {
            JwtError::TokenExpired => AuthError::Expired,
            _ => AuthError::Malformed,
        })?;

        let user_id = claims.user_id().map_err(|_| AuthError::Malformed)?;
        let role = Role::from_str(&claims.role).ok_or(AuthError::Malformed)?;

        Ok(Identity::new(user_id, role, claims.name))
    }

    /// Self-registration always creates a locked participant
    pub async fn register(&self, input: RegisterInput) -> Result<User, DomainError> {
        input.validate()?;
        let username = normalize_username(&input.username);

        info!("Registration attempt for username: {}", username);

        if self.users.find_by_username(&username).await?.is_some() {
            warn!("Registration failed: username already exists: {}", username);
            return Err(ValidationError::DuplicateUsername(username).into());
        }

        let password_hash = PasswordService::hash_blocking(input.password)
            .await
            .map_err(|e| DomainError::InternalError(e.to_string()))?;

        let user = User::new(
            input.full_name.trim().to_string(),
            username,
            password_hash,
            Role::Participant,
            Enrollment {
                student_id: non_blank(input.student_id),
                department: non_blank(input.department),
                phone: non_blank(input.phone),
            },
        )?;

        let created = self.users.create(&user).await?;

        info!("Registration successful for: {}", created.username);
        Ok(created)
    }
}

/// Result of successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}
