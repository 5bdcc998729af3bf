//! Administrative editing of the permission matrix.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{info, instrument};

use skyyard_auth::{
    Action, PermissionEntry, PermissionKey, Resource, Role, all_keys, default_permissions,
};

use crate::policy_store::{PermissionStore, PermissionStoreError};

/// Role header on the policy screen.
#[derive(Debug, Clone, Serialize)]
pub struct RoleRow {
    pub key: Role,
    pub label: &'static str,
    pub summary: &'static str,
    pub exception: &'static str,
    pub locked: bool,
}

/// Labelled column/row header.
#[derive(Debug, Clone, Serialize)]
pub struct Labelled<T> {
    pub key: T,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    #[serde(flatten)]
    pub key: PermissionKey,
    pub allowed: bool,
    pub locked: bool,
}

/// Screen model: every role × resource × action with its current flag.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyMatrix {
    pub roles: Vec<RoleRow>,
    pub resources: Vec<Labelled<Resource>>,
    pub actions: Vec<Labelled<Action>>,
    pub cells: Vec<MatrixCell>,
}

impl PolicyMatrix {
    fn from_entries(entries: &[PermissionEntry]) -> Self {
        let stored: HashMap<PermissionKey, bool> =
            entries.iter().map(|e| (e.key, e.allowed)).collect();

        Self {
            roles: Role::ALL
                .into_iter()
                .map(|role| RoleRow {
                    key: role,
                    label: role.label(),
                    summary: role.summary(),
                    exception: role.exception(),
                    locked: role.is_locked(),
                })
                .collect(),
            resources: Resource::ALL
                .into_iter()
                .map(|key| Labelled { key, label: key.label() })
                .collect(),
            actions: Action::ALL
                .into_iter()
                .map(|key| Labelled { key, label: key.label() })
                .collect(),
            cells: all_keys()
                .map(|key| MatrixCell {
                    key,
                    allowed: stored.get(&key).copied().unwrap_or(false),
                    locked: key.role.is_locked(),
                })
                .collect(),
        }
    }

    pub fn is_allowed(&self, key: PermissionKey) -> bool {
        self.cells.iter().any(|c| c.key == key && c.allowed)
    }
}

/// Reads and saves the editable matrix.
///
/// Locked roles (super-admin) are always written as allowed, whatever the
/// submission says.
pub struct PolicyAdmin<S> {
    store: S,
}

impl<S> PolicyAdmin<S>
where
    S: PermissionStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current matrix; seeds missing defaults first so the screen is never partial.
    pub async fn matrix(&self) -> Result<PolicyMatrix, PermissionStoreError> {
        self.store.ensure_defaults(&default_permissions()).await?;
        let entries = self.store.list().await?;
        Ok(PolicyMatrix::from_entries(&entries))
    }

    /// Replace the whole matrix: granted keys become allowed, everything else denied.
    #[instrument(skip(self, granted), fields(granted = granted.len()), err)]
    pub async fn save_matrix(
        &self,
        granted: &HashSet<PermissionKey>,
    ) -> Result<Vec<PermissionEntry>, PermissionStoreError> {
        let entries: Vec<PermissionEntry> = all_keys()
            .map(|key| PermissionEntry::new(key, key.role.is_locked() || granted.contains(&key)))
            .collect();

        self.store.replace_all(&entries).await?;
        info!(
            allowed = entries.iter().filter(|e| e.allowed).count(),
            total = entries.len(),
            "policy matrix saved"
        );
        Ok(entries)
    }

    /// Single-cell edit.
    #[instrument(skip(self), err)]
    pub async fn set_cell(
        &self,
        key: PermissionKey,
        allowed: bool,
    ) -> Result<PermissionEntry, PermissionStoreError> {
        let allowed = key.role.is_locked() || allowed;
        self.store.upsert(key, allowed).await?;
        Ok(PermissionEntry::new(key, allowed))
    }
}
