//! Repository traits (ports)

pub mod user_repository;
pub mod company_repository;
pub mod placement_repository;
pub mod logbook_repository;
pub mod file_storage;

pub use user_repository::UserRepository;
pub use company_repository::CompanyRepository;
pub use placement_repository::PlacementRepository;
pub use logbook_repository::LogbookRepository;
pub use file_storage::FileStorage;

#[cfg(test)]
pub use user_repository::MockUserRepository;
