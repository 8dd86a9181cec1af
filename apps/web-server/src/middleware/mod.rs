//! Middleware modules.

pub mod auth;
pub mod error;
pub mod query;
pub mod rate_limit;
