//! # Magang Infrastructure
//! 
//! PostgreSQL repositories and local upload storage (adapters).

pub mod database;
pub mod storage;

pub use database::{
    create_pool, run_migrations, PgCompanyRepository, PgLogbookRepository, PgPlacementRepository,
    PgUserRepository,
};
pub use storage::LocalFileStorage;
