// ============================================================================
// Magang Infrastructure - PostgreSQL Logbook Repository
// File: crates/magang-infrastructure/src/database/postgres/logbook_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

use magang_core::domain::{Attendance, LogbookEntry, LogbookScope, LogbookStatus, StatusCounts};
use magang_core::error::{ConflictError, DomainError};
use magang_core::repositories::LogbookRepository;
use magang_shared::{Lifecycle, Timestamps};

use super::{corrupt, db_error};

const ENTRY_COLUMNS: &str = r#"
    e.id, e.participant_id, e.activity_date, e.description, e.evidence,
    e.attendance, e.status, e.created_at, e.updated_at, e.removed_at
"#;

pub struct PgLogbookRepository {
    pool: PgPool,
}

impl PgLogbookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct LogbookRow {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub activity_date: NaiveDate,
    pub description: String,
    pub evidence: Option<String>,
    pub attendance: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl TryFrom<LogbookRow> for LogbookEntry {
    type Error = DomainError;

    fn try_from(row: LogbookRow) -> Result<Self, Self::Error> {
        let status = LogbookStatus::from_str(&row.status).ok_or_else(|| corrupt("status", &row.status))?;
        let attendance = match row.attendance.as_deref() {
            Some(value) => Some(Attendance::from_str(value).ok_or_else(|| corrupt("attendance", value))?),
            None => None,
        };

        Ok(LogbookEntry {
            id: row.id,
            participant_id: row.participant_id,
            activity_date: row.activity_date,
            description: row.description,
            evidence: row.evidence,
            attendance,
            status,
            lifecycle: Lifecycle::from_removed_at(row.removed_at),
            timestamps: Timestamps { created_at: row.created_at, updated_at: row.updated_at },
        })
    }
}

/// WHERE fragment for a listing scope (table alias `e`) and its bind value.
fn scope_filter(scope: LogbookScope) -> (&'static str, Option<Uuid>) {
    match scope {
        LogbookScope::All => ("e.removed_at IS NULL", None),
        LogbookScope::Owner(owner) => ("e.removed_at IS NULL AND e.participant_id = $1", Some(owner)),
        LogbookScope::Supervisor(supervisor) => (
            r#"e.removed_at IS NULL AND EXISTS (
                SELECT 1 FROM placements p
                WHERE p.participant_id = e.participant_id
                  AND p.supervisor_id = $1
                  AND p.removed_at IS NULL
            )"#,
            Some(supervisor),
        ),
    }
}

#[async_trait]
impl LogbookRepository for PgLogbookRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<LogbookEntry>, DomainError> {
        let row: Option<LogbookRow> = sqlx::query_as(&format!(
            "SELECT {} FROM logbook_entries e WHERE e.id = $1 AND e.removed_at IS NULL",
            ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding logbook entry", e))?;

        row.map(LogbookEntry::try_from).transpose()
    }

    async fn list(&self, scope: LogbookScope) -> Result<Vec<LogbookEntry>, DomainError> {
        let (filter, bind) = scope_filter(scope);
        let sql = format!(
            "SELECT {} FROM logbook_entries e WHERE {} ORDER BY e.activity_date DESC, e.created_at DESC",
            ENTRY_COLUMNS, filter
        );

        let mut query = sqlx::query_as::<_, LogbookRow>(&sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("listing logbook entries", e))?;

        rows.into_iter().map(LogbookEntry::try_from).collect()
    }

    async fn create(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError> {
        let row: LogbookRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO logbook_entries AS e (
                id, participant_id, activity_date, description, evidence,
                attendance, status, created_at, updated_at, removed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(entry.id)
        .bind(entry.participant_id)
        .bind(entry.activity_date)
        .bind(&entry.description)
        .bind(&entry.evidence)
        .bind(entry.attendance.map(|a| a.as_str()))
        .bind(entry.status.as_str())
        .bind(entry.timestamps.created_at)
        .bind(entry.timestamps.updated_at)
        .bind(entry.lifecycle.removed_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("creating logbook entry", e))?;

        row.try_into()
    }

    async fn update_content(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError> {
        let row: Option<LogbookRow> = sqlx::query_as(&format!(
            r#"
            UPDATE logbook_entries AS e
            SET
                activity_date = $2,
                description = $3,
                evidence = $4,
                attendance = $5,
                updated_at = $6
            WHERE e.id = $1 AND e.removed_at IS NULL AND e.status = 'pending'
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(entry.id)
        .bind(entry.activity_date)
        .bind(&entry.description)
        .bind(&entry.evidence)
        .bind(entry.attendance.map(|a| a.as_str()))
        .bind(entry.timestamps.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating logbook entry", e))?;

        match row {
            Some(row) => row.try_into(),
            // Reviewed in the meantime, or gone.
            None => match self.find_by_id(&entry.id).await? {
                Some(current) => Err(ConflictError::EntryLocked(current.id).into()),
                None => Err(DomainError::not_found("logbook entry", &entry.id)),
            },
        }
    }

    async fn set_status(&self, entry: &LogbookEntry) -> Result<LogbookEntry, DomainError> {
        let row: Option<LogbookRow> = sqlx::query_as(&format!(
            r#"
            UPDATE logbook_entries AS e
            SET status = $2, updated_at = $3
            WHERE e.id = $1 AND e.removed_at IS NULL
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(entry.id)
        .bind(entry.status.as_str())
        .bind(entry.timestamps.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("setting logbook status", e))?;

        row.ok_or_else(|| DomainError::not_found("logbook entry", &entry.id))?.try_into()
    }

    async fn soft_delete(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query("UPDATE logbook_entries SET removed_at = $2, updated_at = $2 WHERE id = $1 AND removed_at IS NULL")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("deleting logbook entry", e))?;

        Ok(())
    }

    async fn count_by_status(&self, scope: LogbookScope) -> Result<StatusCounts, DomainError> {
        let (filter, bind) = scope_filter(scope);
        let sql = format!("SELECT e.status, COUNT(*) FROM logbook_entries e WHERE {} GROUP BY e.status", filter);

        let mut query = sqlx::query_as::<_, (String, i64)>(&sql);
        if let Some(id) = bind {
            query = query.bind(id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("counting logbook entries", e))?;

        let mut counts = StatusCounts::default();
        for (status, n) in rows {
            let status = LogbookStatus::from_str(&status).ok_or_else(|| corrupt("status", &status))?;
            counts.add(status, n);
        }
        Ok(counts)
    }
}
