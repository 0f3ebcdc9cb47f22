// ============================================================================
// Magang Infrastructure - PostgreSQL Company Repository
// File: crates/magang-infrastructure/src/database/postgres/company_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use magang_core::domain::Company;
use magang_core::error::{ConflictError, DomainError};
use magang_core::repositories::CompanyRepository;
use magang_shared::{Lifecycle, Timestamps};

use super::db_error;

pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            name: row.name,
            address: row.address,
            contact: row.contact,
            lifecycle: Lifecycle::from_removed_at(row.removed_at),
            timestamps: Timestamps { created_at: row.created_at, updated_at: row.updated_at },
        }
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(
            r#"
            SELECT id, name, address, contact, created_at, updated_at, removed_at
            FROM companies
            WHERE id = $1 AND removed_at IS NULL
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding company", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self) -> Result<Vec<Company>, DomainError> {
        let rows: Vec<CompanyRow> = sqlx::query_as(
            r#"
            SELECT id, name, address, contact, created_at, updated_at, removed_at
            FROM companies
            WHERE removed_at IS NULL
            ORDER BY name ASC
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing companies", e))?;

        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn create(&self, company: &Company) -> Result<Company, DomainError> {
        let row: CompanyRow = sqlx::query_as(
            r#"
            INSERT INTO companies (id, name, address, contact, created_at, updated_at, removed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, address, contact, created_at, updated_at, removed_at
            "#
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.contact)
        .bind(company.timestamps.created_at)
        .bind(company.timestamps.updated_at)
        .bind(company.lifecycle.removed_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("creating company", e))?;

        Ok(row.into())
    }

    async fn update(&self, company: &Company) -> Result<Company, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(
            r#"
            UPDATE companies
            SET name = $2, address = $3, contact = $4, updated_at = $5
            WHERE id = $1 AND removed_at IS NULL
            RETURNING id, name, address, contact, created_at, updated_at, removed_at
            "#
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.address)
        .bind(&company.contact)
        .bind(company.timestamps.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating company", e))?;

        row.map(Company::from).ok_or_else(|| DomainError::not_found("company", &company.id))
    }

    async fn soft_delete(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut transaction = self.pool.begin().await.map_err(|e| db_error("opening transaction", e))?;

        // Waits out placement writes holding the row, so the check below sees them.
        let live: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM companies WHERE id = $1 AND removed_at IS NULL FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *transaction)
                .await
                .map_err(|e| db_error("locking company", e))?;
        if live.is_none() {
            return Err(DomainError::not_found("company", id));
        }

        let deleted = sqlx::query(
            r#"
            UPDATE companies
            SET removed_at = $2, updated_at = $2
            WHERE id = $1
              AND NOT EXISTS (
                SELECT 1 FROM placements WHERE company_id = $1 AND removed_at IS NULL
              )
            "#
        )
        .bind(id)
        .bind(at)
        .execute(&mut *transaction)
        .await
        .map_err(|e| db_error("deleting company", e))?;

        if deleted.rows_affected() == 0 {
            return Err(ConflictError::CompanyInUse(*id).into());
        }

        transaction.commit().await.map_err(|e| db_error("committing company delete", e))?;
        Ok(())
    }

    async fn count(&self) -> Result<i64, DomainError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies WHERE removed_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("counting companies", e))?;

        Ok(n)
    }
}
