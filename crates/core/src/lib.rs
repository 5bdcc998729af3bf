//! `skyyard-core`: shared primitives for the yard administration domain.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{OwnerId, UserId};
