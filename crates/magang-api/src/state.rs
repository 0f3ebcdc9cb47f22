use std::sync::Arc;

use sqlx::PgPool;
use magang_core::services::{
    CompanyService, IdentityService, LogbookService, PlacementService, StatsService, UserService,
};
use magang_shared::config::AppConfig;

/// Shared handles injected into every handler. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub identity: Arc<IdentityService>,
    pub users: Arc<UserService>,
    pub companies: Arc<CompanyService>,
    pub placements: Arc<PlacementService>,
    pub logbook: Arc<LogbookService>,
    pub stats: Arc<StatsService>,
}
