//! # Yatube Shared
//!
//! Payloads exchanged with browsers: submitted forms, query strings and
//! the error page body.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
