// ============================================================================
// Magang Infrastructure - PostgreSQL Placement Repository
// File: crates/magang-infrastructure/src/database/postgres/placement_repo_impl.rs
// ============================================================================
//! Placement writes run in one transaction together with the participant's
//! status and company columns.

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use tracing::info;
use chrono::{DateTime, Utc};

use magang_core::domain::Placement;
use magang_core::error::{ConflictError, DomainError};
use magang_core::repositories::PlacementRepository;
use magang_shared::{Lifecycle, Timestamps};

use super::{db_error, release_participants, violates};

const ACTIVE_PARTICIPANT_KEY: &str = "placements_participant_active_key";

pub struct PgPlacementRepository {
    pool: PgPool,
}

impl PgPlacementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PlacementRow {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub supervisor_id: Uuid,
    pub company_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl From<PlacementRow> for Placement {
    fn from(row: PlacementRow) -> Self {
        Placement {
            id: row.id,
            participant_id: row.participant_id,
            supervisor_id: row.supervisor_id,
            company_id: row.company_id,
            lifecycle: Lifecycle::from_removed_at(row.removed_at),
            timestamps: Timestamps { created_at: row.created_at, updated_at: row.updated_at },
        }
    }
}

fn placement_error(context: &str, participant_id: Uuid, e: sqlx::Error) -> DomainError {
    if violates(&e, ACTIVE_PARTICIPANT_KEY) {
        ConflictError::AlreadyPlaced(participant_id).into()
    } else {
        db_error(context, e)
    }
}

async fn activate_participant(
    conn: &mut PgConnection,
    participant_id: Uuid,
    company_id: Uuid,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET status = 'active', company_id = $2, updated_at = $3 WHERE id = $1")
        .bind(participant_id)
        .bind(company_id)
        .bind(at)
        .execute(conn)
        .await?;
    Ok(())
}

/// Holds the company row against a concurrent delete until commit.
async fn lock_live_company(conn: &mut PgConnection, company_id: Uuid) -> Result<(), DomainError> {
    let live: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM companies WHERE id = $1 AND removed_at IS NULL FOR SHARE")
            .bind(company_id)
            .fetch_optional(conn)
            .await
            .map_err(|e| db_error("locking company", e))?;

    live.map(|_| ()).ok_or_else(|| DomainError::not_found("company", &company_id))
}

#[async_trait]
impl PlacementRepository for PgPlacementRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Placement>, DomainError> {
        let row: Option<PlacementRow> = sqlx::query_as(
            r#"
            SELECT id, participant_id, supervisor_id, company_id, created_at, updated_at, removed_at
            FROM placements
            WHERE id = $1 AND removed_at IS NULL
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding placement", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_active_by_participant(&self, participant_id: &Uuid) -> Result<Option<Placement>, DomainError> {
        let row: Option<PlacementRow> = sqlx::query_as(
            r#"
            SELECT id, participant_id, supervisor_id, company_id, created_at, updated_at, removed_at
            FROM placements
            WHERE participant_id = $1 AND removed_at IS NULL
            "#
        )
        .bind(participant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding participant placement", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, supervisor_id: Option<Uuid>) -> Result<Vec<Placement>, DomainError> {
        let rows: Vec<PlacementRow> = sqlx::query_as(
            r#"
            SELECT id, participant_id, supervisor_id, company_id, created_at, updated_at, removed_at
            FROM placements
            WHERE removed_at IS NULL AND ($1::uuid IS NULL OR supervisor_id = $1)
            ORDER BY created_at DESC
            "#
        )
        .bind(supervisor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing placements", e))?;

        Ok(rows.into_iter().map(Placement::from).collect())
    }

    async fn create(&self, placement: &Placement) -> Result<Placement, DomainError> {
        let mut transaction = self.pool.begin().await.map_err(|e| db_error("opening transaction", e))?;
        lock_live_company(&mut transaction, placement.company_id).await?;

        let row: PlacementRow = sqlx::query_as(
            r#"
            INSERT INTO placements (id, participant_id, supervisor_id, company_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, participant_id, supervisor_id, company_id, created_at, updated_at, removed_at
            "#
        )
        .bind(placement.id)
        .bind(placement.participant_id)
        .bind(placement.supervisor_id)
        .bind(placement.company_id)
        .bind(placement.timestamps.created_at)
        .bind(placement.timestamps.updated_at)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|e| placement_error("creating placement", placement.participant_id, e))?;

        activate_participant(&mut transaction, row.participant_id, row.company_id, row.updated_at)
            .await
            .map_err(|e| db_error("activating participant", e))?;

        transaction.commit().await.map_err(|e| db_error("committing placement", e))?;

        info!("Placement {} created for participant {}", row.id, row.participant_id);
        Ok(row.into())
    }

    async fn update(&self, placement: &Placement) -> Result<Placement, DomainError> {
        let mut transaction = self.pool.begin().await.map_err(|e| db_error("opening transaction", e))?;

        let previous: Option<(Uuid,)> = sqlx::query_as(
            "SELECT participant_id FROM placements WHERE id = $1 AND removed_at IS NULL FOR UPDATE"
        )
        .bind(placement.id)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|e| db_error("locking placement", e))?;

        let (previous_participant,) = previous.ok_or_else(|| DomainError::not_found("placement", &placement.id))?;
        lock_live_company(&mut transaction, placement.company_id).await?;
        let at = placement.timestamps.updated_at;

        if previous_participant != placement.participant_id {
            release_participants(&mut transaction, &[previous_participant], at)
                .await
                .map_err(|e| db_error("releasing previous participant", e))?;
        }

        let row: PlacementRow = sqlx::query_as(
            r#"
            UPDATE placements
            SET participant_id = $2, supervisor_id = $3, company_id = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, participant_id, supervisor_id, company_id, created_at, updated_at, removed_at
            "#
        )
        .bind(placement.id)
        .bind(placement.participant_id)
        .bind(placement.supervisor_id)
        .bind(placement.company_id)
        .bind(at)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|e| placement_error("updating placement", placement.participant_id, e))?;

        activate_participant(&mut transaction, row.participant_id, row.company_id, at)
            .await
            .map_err(|e| db_error("activating participant", e))?;

        transaction.commit().await.map_err(|e| db_error("committing placement", e))?;
        Ok(row.into())
    }

    async fn remove(&self, id: &Uuid, at: DateTime<Utc>) -> Result<Placement, DomainError> {
        let mut transaction = self.pool.begin().await.map_err(|e| db_error("opening transaction", e))?;

        let row: Option<PlacementRow> = sqlx::query_as(
            r#"
            UPDATE placements
            SET removed_at = $2, updated_at = $2
            WHERE id = $1 AND removed_at IS NULL
            RETURNING id, participant_id, supervisor_id, company_id, created_at, updated_at, removed_at
            "#
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|e| db_error("removing placement", e))?;

        let row = row.ok_or_else(|| DomainError::not_found("placement", id))?;
        release_participants(&mut transaction, &[row.participant_id], at)
            .await
            .map_err(|e| db_error("releasing participant", e))?;

        transaction.commit().await.map_err(|e| db_error("committing placement removal", e))?;

        info!("Placement {} removed, participant {} locked", row.id, row.participant_id);
        Ok(row.into())
    }

    async fn count_active(&self) -> Result<i64, DomainError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM placements WHERE removed_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("counting placements", e))?;

        Ok(n)
    }
}
