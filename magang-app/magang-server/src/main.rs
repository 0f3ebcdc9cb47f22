use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use magang_api::{build_router, AppState};
use magang_core::domain::UploadPolicy;
use magang_core::services::{
    CompanyService, IdentityService, LogbookService, PlacementService, StatsService, UserService,
};
use magang_infrastructure::{
    create_pool, run_migrations, LocalFileStorage, PgCompanyRepository, PgLogbookRepository,
    PgPlacementRepository, PgUserRepository,
};
use magang_security::JwtService;
use magang_shared::config::AppConfig;
use magang_shared::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (.env is read inside)
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize telemetry
    init_telemetry(&config.log).context("failed to initialise telemetry")?;
    info!("{} starting ({})...", config.app.name, config.app.env);

    // Connect to Database
    let pool = create_pool(&config.database).await.context("failed to connect to database")?;
    info!("Database connection established.");

    run_migrations(&pool).await.context("failed to run migrations")?;
    info!("Database migrations applied.");

    // Repositories
    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let companies = Arc::new(PgCompanyRepository::new(pool.clone()));
    let placements = Arc::new(PgPlacementRepository::new(pool.clone()));
    let entries = Arc::new(PgLogbookRepository::new(pool.clone()));
    let storage = Arc::new(LocalFileStorage::new(&config.upload.dir, &config.upload.public_path));

    // Services
    let policy = UploadPolicy::new(config.upload.max_bytes);
    let jwt = Arc::new(JwtService::new(&config.jwt.secret, config.jwt.session_ttl_seconds));
    let placement_service = Arc::new(PlacementService::new(placements.clone(), users.clone(), companies.clone()));

    let state = AppState {
        db: pool.clone(),
        identity: Arc::new(IdentityService::new(users.clone(), jwt)),
        users: Arc::new(UserService::new(users.clone(), placements.clone(), storage.clone(), policy)),
        companies: Arc::new(CompanyService::new(companies.clone())),
        logbook: Arc::new(LogbookService::new(
            entries.clone(),
            users.clone(),
            placement_service.clone(),
            storage,
            policy,
        )),
        placements: placement_service,
        stats: Arc::new(StatsService::new(users, companies, placements, entries)),
        config: Arc::new(config.clone()),
    };

    let app = build_router(state);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse().context("invalid app.host")?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Database pool closed, bye.");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
