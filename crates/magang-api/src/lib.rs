//! # Magang API
//! 
//! HTTP handlers, extractors, response envelope and router assembly.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
