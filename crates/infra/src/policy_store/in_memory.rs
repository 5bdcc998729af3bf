use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use skyyard_auth::{PermissionEntry, PermissionKey};

use super::r#trait::{PermissionStore, PermissionStoreError};

/// In-memory permission store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    entries: RwLock<BTreeMap<PermissionKey, bool>>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of stored keys; a poisoned lock is `Unavailable`, as for every store call.
    pub fn len(&self) -> Result<usize, PermissionStoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, PermissionStoreError> {
        Ok(self.read()?.is_empty())
    }

    fn read(
        &self,
    ) -> Result<RwLockReadGuard<'_, BTreeMap<PermissionKey, bool>>, PermissionStoreError> {
        self.entries
            .read()
            .map_err(|_| PermissionStoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, BTreeMap<PermissionKey, bool>>, PermissionStoreError> {
        self.entries
            .write()
            .map_err(|_| PermissionStoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn ensure_defaults(
        &self,
        defaults: &[PermissionEntry],
    ) -> Result<(), PermissionStoreError> {
        let mut map = self.write()?;
        for entry in defaults {
            map.entry(entry.key).or_insert(entry.allowed);
        }
        Ok(())
    }

    async fn get_permission(
        &self,
        key: PermissionKey,
    ) -> Result<Option<bool>, PermissionStoreError> {
        Ok(self.read()?.get(&key).copied())
    }

    async fn upsert(&self, key: PermissionKey, allowed: bool) -> Result<(), PermissionStoreError> {
        self.write()?.insert(key, allowed);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PermissionEntry>, PermissionStoreError> {
        Ok(self
            .read()?
            .iter()
            .map(|(key, allowed)| PermissionEntry::new(*key, *allowed))
            .collect())
    }

    async fn replace_all(&self, entries: &[PermissionEntry]) -> Result<(), PermissionStoreError> {
        // One write lock: readers see either the old or the new matrix.
        let mut map = self.write()?;
        for entry in entries {
            map.insert(entry.key, entry.allowed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyyard_auth::{Action, Resource, Role, default_permissions};

    fn key(role: Role, resource: Resource, action: Action) -> PermissionKey {
        PermissionKey::new(role, resource, action)
    }

    #[tokio::test]
    async fn missing_key_is_not_found_rather_than_error() {
        let store = InMemoryPermissionStore::new();
        let found = store
            .get_permission(key(Role::Admin, Resource::Users, Action::Read))
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let store = InMemoryPermissionStore::new();
        let k = key(Role::Staff, Resource::Reports, Action::Update);
        store.upsert(k, true).await.unwrap();
        assert_eq!(store.get_permission(k).await.unwrap(), Some(true));
        store.upsert(k, false).await.unwrap();
        assert_eq!(store.get_permission(k).await.unwrap(), Some(false));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn ensure_defaults_is_idempotent_and_keeps_overrides() {
        let store = InMemoryPermissionStore::new();
        let defaults = default_permissions();
        let override_key = key(Role::Admin, Resource::Containers, Action::Read);
        store.upsert(override_key, true).await.unwrap();

        store.ensure_defaults(&defaults).await.unwrap();
        let once = store.list().await.unwrap();
        store.ensure_defaults(&defaults).await.unwrap();
        let twice = store.list().await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.len(), defaults.len());
        assert_eq!(store.get_permission(override_key).await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn replace_all_overwrites_every_given_key() {
        let store = InMemoryPermissionStore::new();
        store.ensure_defaults(&default_permissions()).await.unwrap();

        let flipped: Vec<_> = default_permissions()
            .into_iter()
            .map(|e| PermissionEntry::new(e.key, !e.allowed))
            .collect();
        store.replace_all(&flipped).await.unwrap();

        let mut listed = store.list().await.unwrap();
        let mut expected = flipped.clone();
        listed.sort_by_key(|e| e.key);
        expected.sort_by_key(|e| e.key);
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn poisoned_lock_reports_unavailable_everywhere() {
        let store = Arc::new(InMemoryPermissionStore::new());
        store.upsert(key(Role::Admin, Resource::Users, Action::Read), true).await.unwrap();

        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(PermissionStoreError::Unavailable(_))));
        assert!(matches!(store.is_empty(), Err(PermissionStoreError::Unavailable(_))));
        assert!(matches!(
            store.get_permission(key(Role::Admin, Resource::Users, Action::Read)).await,
            Err(PermissionStoreError::Unavailable(_))
        ));
    }
}
