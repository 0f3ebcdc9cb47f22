//! # Magang Shared
//! 
//! Shared configuration, telemetry, constants, and common types for the
//! internship (magang) tracking backend.

pub mod constants;
pub mod types;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
