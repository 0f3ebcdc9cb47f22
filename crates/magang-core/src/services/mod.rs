//! Domain services (business logic)

pub mod identity_service;
pub mod user_service;
pub mod company_service;
pub mod placement_service;
pub mod logbook_service;
pub mod stats_service;

pub use identity_service::{IdentityService, LoginResult, RegisterInput};
pub use user_service::{NewUserInput, Profile, ProfileUpdate, UpdateUserInput, UserService};
pub use company_service::{CompanyInput, CompanyService};
pub use placement_service::{PlacementInput, PlacementService};
pub use logbook_service::{EditLogbook, LogbookService, SubmitLogbook};
pub use stats_service::{AdminStats, ParticipantStats, StatsService, SupervisorStats, UsersByRole};
