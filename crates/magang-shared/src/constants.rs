//! Application-wide constants

/// Session token lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 604_800;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_UPLOAD_PUBLIC_PATH: &str = "/uploads";
/// Evidence and profile photo size cap: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const BCRYPT_COST: u32 = 10;
pub const MIN_USERNAME_LENGTH: u64 = 3;
pub const MAX_USERNAME_LENGTH: u64 = 50;
pub const MIN_PASSWORD_LENGTH: u64 = 6;
pub const MAX_PASSWORD_LENGTH: u64 = 128;
