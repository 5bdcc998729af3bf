//! Authorization decisions and administration over a [`PermissionStore`].
//!
//! [`PermissionStore`]: crate::policy_store::PermissionStore

pub mod admin;
pub mod engine;
pub mod seed_guard;

pub use admin::{Labelled, MatrixCell, PolicyAdmin, PolicyMatrix, RoleRow};
pub use engine::{EngineConfig, PolicyEngine};
pub use seed_guard::SeedGuard;
