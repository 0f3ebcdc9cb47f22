// ============================================================================
// Magang API - Router
// File: crates/magang-api/src/routes.rs
// ============================================================================

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, warn};

use magang_shared::config::CorsSettings;

use crate::error::ApiError;
use crate::handlers::{auth, companies, health, logbook, placements, stats, users};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload = state.config.upload.clone();
    let cors = cors_layer(&state.config.cors);

    let public_routes = Router::new()
        .route("/", get(health::health_check))
        .route("/health", get(health::health_check))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register));

    let account_routes = Router::new()
        .route("/auth/me", get(auth::me).put(auth::update_me))
        .route("/auth/me/photo", post(auth::upload_photo))
        .route("/auth/password", put(auth::change_password));

    // `/users/{key}` is a role name on GET and a user id on PUT/DELETE.
    let user_routes = Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/detail/{id}", get(users::get))
        .route(
            "/users/{key}",
            get(users::list_by_role).put(users::update).delete(users::delete),
        );

    let company_routes = Router::new()
        .route("/companies", get(companies::list).post(companies::create))
        .route(
            "/companies/{id}",
            get(companies::get).put(companies::update).delete(companies::delete),
        );

    let placement_routes = Router::new()
        .route("/placements", get(placements::list).post(placements::create))
        .route("/placements/me", get(placements::mine))
        .route(
            "/placements/{id}",
            get(placements::get).put(placements::update).delete(placements::delete),
        );

    let logbook_routes = Router::new()
        .route("/logbook", get(logbook::list_all).post(logbook::submit))
        .route("/logbook/me", get(logbook::list_mine))
        .route("/logbook/supervisor", get(logbook::list_supervised))
        .route(
            "/logbook/{id}",
            get(logbook::get).put(logbook::update).delete(logbook::delete),
        )
        .route("/logbook-status/{id}", put(logbook::update_status));

    let stats_routes = Router::new()
        .route("/admin/stats", get(stats::admin))
        .route("/supervisor/stats", get(stats::supervisor))
        .route("/participant/stats", get(stats::participant));

    Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .merge(user_routes)
        .merge(company_routes)
        .merge(placement_routes)
        .merge(logbook_routes)
        .merge(stats_routes)
        .nest_service(&upload.public_path, ServeDir::new(&upload.dir))
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(upload.max_bytes + MULTIPART_OVERHEAD))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() || settings.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error("INTERNAL_ERROR", "Internal server error")),
    )
        .into_response()
}
