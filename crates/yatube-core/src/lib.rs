//! # Yatube Core
//!
//! The domain layer of Yatube.
//! This crate contains the post/group model, the listing and form rules
//! and the ports infrastructure has to implement. It has no infrastructure
//! dependencies.

pub mod admin;
pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;

pub use error::{DomainError, RepoError};
