//! Permission store boundary.
//!
//! Persists one `allowed` flag per `(role, resource, action)` key. The store
//! is an override layer over the built-in matrix; callers decide what an
//! error means (the decision engine falls back to defaults).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryPermissionStore;
pub use postgres::PostgresPermissionStore;
pub use r#trait::{PermissionStore, PermissionStoreError};
