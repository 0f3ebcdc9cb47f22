//! # Magang Core
//! 
//! Domain entities, access control, repository traits, and services for the
//! internship tracking backend.

pub mod domain;
pub mod authorization;
pub mod services;
pub mod repositories;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
