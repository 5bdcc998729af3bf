//! Infrastructure layer: permission storage, lazy seeding, decisions.

pub mod policy;
pub mod policy_store;

#[cfg(test)]
mod integration_tests;

pub use policy::{EngineConfig, PolicyAdmin, PolicyEngine, PolicyMatrix, SeedGuard};
pub use policy_store::{
    InMemoryPermissionStore, PermissionStore, PermissionStoreError, PostgresPermissionStore,
};
