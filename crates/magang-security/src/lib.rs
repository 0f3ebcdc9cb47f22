//! # Magang Security
//! 
//! Security utilities: session tokens (JWT) and password hashing (bcrypt).

pub mod jwt;
pub mod password;

pub use jwt::{JwtError, JwtService, SessionClaims};
pub use password::{PasswordError, PasswordService};
