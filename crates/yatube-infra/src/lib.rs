//! # Yatube Infrastructure
//!
//! Concrete implementations of the ports defined in `yatube-core`:
//! repositories, password hashing, session tokens and rate limiting.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory repositories only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT sessions + Argon2 password hashing
//! - `rate-limit` - Rate limiting via governor

pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use database::InMemoryStore;

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
