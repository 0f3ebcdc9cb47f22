// ============================================================================
// Magang Infrastructure - PostgreSQL User Repository
// File: crates/magang-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use tracing::info;
use chrono::{DateTime, Utc};

use magang_core::domain::{AccountStatus, Enrollment, Role, User};
use magang_core::error::{DomainError, ValidationError};
use magang_core::repositories::UserRepository;
use magang_shared::{Lifecycle, Timestamps};

use super::{corrupt, db_error, release_participants, violates};

const USERNAME_KEY: &str = "users_username_live_key";

const USER_COLUMNS: &str = r#"
    id, full_name, username, password_hash, role, photo,
    student_id, department, phone, company_id, status, last_login_at,
    created_at, updated_at, removed_at
"#;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub photo: Option<String>,
    pub student_id: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub company_id: Option<Uuid>,
    pub status: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role).ok_or_else(|| corrupt("role", &row.role))?;
        let status = AccountStatus::from_str(&row.status).ok_or_else(|| corrupt("status", &row.status))?;

        Ok(User {
            id: row.id,
            full_name: row.full_name,
            username: row.username,
            password_hash: row.password_hash,
            role,
            photo: row.photo,
            enrollment: Enrollment {
                student_id: row.student_id,
                department: row.department,
                phone: row.phone,
            },
            company_id: row.company_id,
            status,
            last_login_at: row.last_login_at,
            lifecycle: Lifecycle::from_removed_at(row.removed_at),
            timestamps: Timestamps { created_at: row.created_at, updated_at: row.updated_at },
        })
    }
}

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>, DomainError> {
    rows.into_iter().map(User::try_from).collect()
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE id = $1 AND removed_at IS NULL",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding user by id", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE username = $1 AND removed_at IS NULL",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding user by username", e))?;

        row.map(User::try_from).transpose()
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM users
            WHERE removed_at IS NULL AND ($1::text IS NULL OR role = $1)
            ORDER BY full_name ASC
            "#,
            USER_COLUMNS
        ))
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing users", e))?;

        into_users(rows)
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        info!("Creating user with username: {}", user.username);

        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (
                id, full_name, username, password_hash, role, photo,
                student_id, department, phone, company_id, status, last_login_at,
                created_at, updated_at, removed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.photo)
        .bind(&user.enrollment.student_id)
        .bind(&user.enrollment.department)
        .bind(&user.enrollment.phone)
        .bind(user.company_id)
        .bind(user.status.as_str())
        .bind(user.last_login_at)
        .bind(user.timestamps.created_at)
        .bind(user.timestamps.updated_at)
        .bind(user.lifecycle.removed_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, USERNAME_KEY) {
                ValidationError::DuplicateUsername(user.username.clone()).into()
            } else {
                db_error("creating user", e)
            }
        })?;

        info!("User created successfully: {}", row.id);
        row.try_into()
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET
                full_name = $2,
                username = $3,
                password_hash = $4,
                role = $5,
                photo = $6,
                student_id = $7,
                department = $8,
                phone = $9,
                updated_at = $10
            WHERE id = $1 AND removed_at IS NULL
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.photo)
        .bind(&user.enrollment.student_id)
        .bind(&user.enrollment.department)
        .bind(&user.enrollment.phone)
        .bind(user.timestamps.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, USERNAME_KEY) {
                ValidationError::DuplicateUsername(user.username.clone()).into()
            } else {
                db_error("updating user", e)
            }
        })?;

        row.ok_or_else(|| DomainError::not_found("user", &user.id))?.try_into()
    }

    async fn record_login(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("recording login", e))?;

        Ok(())
    }

    async fn soft_delete(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut transaction = self.pool.begin().await.map_err(|e| db_error("opening transaction", e))?;

        let released: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE placements
            SET removed_at = $2, updated_at = $2
            WHERE removed_at IS NULL AND (participant_id = $1 OR supervisor_id = $1)
            RETURNING participant_id
            "#
        )
        .bind(id)
        .bind(at)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|e| db_error("closing placements of deleted user", e))?;

        let participants: Vec<Uuid> = released.into_iter().map(|(p,)| p).collect();
        release_participants(&mut transaction, &participants, at)
            .await
            .map_err(|e| db_error("releasing participants", e))?;

        sqlx::query("UPDATE users SET removed_at = $2, updated_at = $2 WHERE id = $1 AND removed_at IS NULL")
            .bind(id)
            .bind(at)
            .execute(&mut *transaction)
            .await
            .map_err(|e| db_error("deleting user", e))?;

        transaction.commit().await.map_err(|e| db_error("committing user deletion", e))?;

        info!("User {} deleted, {} placement(s) closed", id, participants.len());
        Ok(())
    }

    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>, DomainError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT role, COUNT(*) FROM users WHERE removed_at IS NULL GROUP BY role"
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("counting users by role", e))?;

        rows.into_iter()
            .map(|(role, n)| Role::from_str(&role).map(|r| (r, n)).ok_or_else(|| corrupt("role", &role)))
            .collect()
    }
}
