//! # Magang Core - Domain Module
//! 
//! Domain entities for the internship tracking backend.

pub mod user;
pub mod company;
pub mod placement;
pub mod logbook;
pub mod identity;
pub mod upload;

// Re-export all entities and enums
pub use user::{AccountStatus, Enrollment, Role, User};
pub use company::Company;
pub use placement::Placement;
pub use logbook::{Attendance, LogbookEntry, LogbookScope, LogbookStatus, StatusCounts};
pub use identity::Identity;
pub use upload::{FileUpload, UploadKind, UploadPolicy};
