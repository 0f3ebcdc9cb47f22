//! PostgreSQL repository implementations

pub mod user_repo_impl;
pub mod company_repo_impl;
pub mod placement_repo_impl;
pub mod logbook_repo_impl;

pub use user_repo_impl::PgUserRepository;
pub use company_repo_impl::PgCompanyRepository;
pub use placement_repo_impl::PgPlacementRepository;
pub use logbook_repo_impl::PgLogbookRepository;

use magang_core::error::DomainError;
use tracing::error;

/// Logs and wraps an sqlx failure.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

/// True when `e` violates the named unique index.
pub(crate) fn violates(e: &sqlx::Error, constraint: &str) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation() && db.constraint() == Some(constraint))
        .unwrap_or(false)
}

/// Row carried an enum value the domain does not know.
pub(crate) fn corrupt(column: &str, value: &str) -> DomainError {
    error!("Unexpected {} value in database: {}", column, value);
    DomainError::InternalError(format!("unexpected {} value: {}", column, value))
}

/// Puts participants back to locked with no company, inside the caller's
/// transaction.
pub(crate) async fn release_participants(
    tx: &mut sqlx::PgConnection,
    participant_ids: &[uuid::Uuid],
    at: chrono::DateTime<chrono::Utc>,
) -> Result<(), sqlx::Error> {
    if participant_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        UPDATE users
        SET status = 'locked', company_id = NULL, updated_at = $2
        WHERE id = ANY($1)
        "#
    )
    .bind(participant_ids)
    .bind(at)
    .execute(tx)
    .await?;
    Ok(())
}
