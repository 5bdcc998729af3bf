use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use skyyard_auth::{PermissionEntry, PermissionKey};

/// Permission store operation error.
///
/// Every variant means "the store could not answer"; none of them is a
/// statement about the permission itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PermissionStoreError {
    /// Connection refused, pool closed, I/O failure.
    #[error("permission store unavailable: {0}")]
    Unavailable(String),

    /// The operation did not finish within the configured limit.
    #[error("permission store timed out after {0:?}")]
    Timeout(Duration),

    /// The query itself failed.
    #[error("permission store query failed: {0}")]
    Query(String),
}

/// Key/value store of permission overrides.
///
/// Implementations must make the upsert atomic per key (unique constraint +
/// conflict handling) so concurrent first-use seeding never duplicates rows.
#[async_trait::async_trait]
pub trait PermissionStore: Send + Sync {
    /// Insert every entry whose key is missing; existing keys are untouched.
    ///
    /// Idempotent. A concurrent insert of the same key counts as success.
    async fn ensure_defaults(
        &self,
        defaults: &[PermissionEntry],
    ) -> Result<(), PermissionStoreError>;

    /// Point lookup. `Ok(None)` means no row for the key (not an error).
    async fn get_permission(
        &self,
        key: PermissionKey,
    ) -> Result<Option<bool>, PermissionStoreError>;

    /// Insert or replace a single entry's flag.
    async fn upsert(&self, key: PermissionKey, allowed: bool) -> Result<(), PermissionStoreError>;

    /// All stored entries.
    async fn list(&self) -> Result<Vec<PermissionEntry>, PermissionStoreError>;

    /// Upsert every entry as one unit: either all are written or none.
    async fn replace_all(&self, entries: &[PermissionEntry]) -> Result<(), PermissionStoreError>;
}

#[async_trait::async_trait]
impl<S> PermissionStore for Arc<S>
where
    S: PermissionStore + ?Sized,
{
    async fn ensure_defaults(
        &self,
        defaults: &[PermissionEntry],
    ) -> Result<(), PermissionStoreError> {
        (**self).ensure_defaults(defaults).await
    }

    async fn get_permission(
        &self,
        key: PermissionKey,
    ) -> Result<Option<bool>, PermissionStoreError> {
        (**self).get_permission(key).await
    }

    async fn upsert(&self, key: PermissionKey, allowed: bool) -> Result<(), PermissionStoreError> {
        (**self).upsert(key, allowed).await
    }

    async fn list(&self) -> Result<Vec<PermissionEntry>, PermissionStoreError> {
        (**self).list().await
    }

    async fn replace_all(&self, entries: &[PermissionEntry]) -> Result<(), PermissionStoreError> {
        (**self).replace_all(entries).await
    }
}
