//! Permission decision engine.
//!
//! Layers, in order: super-admin bypass, lazy seeding, stored entry, owner
//! scoping. When the store cannot answer, the decision is recomputed from the
//! built-in matrix with the same owner scoping; it is never a blanket allow.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use skyyard_auth::{
    Action, AuthUser, Decision, DecisionBasis, PermissionKey, Resource, Role, decide_from_defaults,
    default_permissions, owner_scope_permits,
};
use skyyard_core::OwnerId;

use crate::policy::SeedGuard;
use crate::policy_store::{PermissionStore, PermissionStoreError};

/// Decision engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound for a single seed or lookup; exceeding it counts as a store error.
    pub lookup_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Some(Duration::from_secs(2)),
        }
    }
}

/// Answers allow/deny for `(user, action, resource, owner)`.
///
/// Owns its seeding state; build one per process (composition root) and
/// share it behind an `Arc`.
pub struct PolicyEngine<S> {
    store: S,
    seed: SeedGuard,
    config: EngineConfig,
}

impl<S> PolicyEngine<S>
where
    S: PermissionStore,
{
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            seed: SeedGuard::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Whether the default matrix has been written to the store.
    pub fn is_seeded(&self) -> bool {
        self.seed.is_seeded()
    }

    /// Seed the default matrix now instead of on the first decision.
    ///
    /// The lookup timeout covers waiting for a concurrent seed as well as
    /// seeding, so a hung store costs each caller at most one timeout.
    /// Failure is not fatal: later decisions retry the seed.
    pub async fn ensure_initialized(&self) -> Result<(), PermissionStoreError> {
        let seed = self.seed.ensure(|| async {
            let defaults = default_permissions();
            self.store.ensure_defaults(&defaults).await
        });
        self.bounded(seed).await
    }

    pub async fn allow(
        &self,
        user: Option<&AuthUser>,
        action: Action,
        resource: Resource,
        owner: OwnerId,
    ) -> bool {
        self.decide(user, action, resource, owner).await.allowed
    }

    /// Like [`allow`](Self::allow), but parses action/resource text from the boundary.
    pub async fn allow_raw(
        &self,
        user: Option<&AuthUser>,
        action: &str,
        resource: &str,
        owner: OwnerId,
    ) -> bool {
        self.decide_raw(user, action, resource, owner).await.allowed
    }

    pub async fn decide_raw(
        &self,
        user: Option<&AuthUser>,
        action: &str,
        resource: &str,
        owner: OwnerId,
    ) -> Decision {
        let Some(user) = user else {
            return Decision::deny(DecisionBasis::NoUser);
        };
        if user.is_super_admin() {
            return Decision::allow(DecisionBasis::SuperAdmin);
        }
        match (Action::parse(action), Resource::parse(resource)) {
            (Some(action), Some(resource)) => {
                self.decide(Some(user), action, resource, owner).await
            }
            _ => Decision::deny(DecisionBasis::UnknownTarget),
        }
    }

    /// Full decision with its basis.
    pub async fn decide(
        &self,
        user: Option<&AuthUser>,
        action: Action,
        resource: Resource,
        owner: OwnerId,
    ) -> Decision {
        let Some(user) = user else {
            return Decision::deny(DecisionBasis::NoUser);
        };
        let Some(role) = user.role() else {
            debug!(user_id = %user.id, role = %user.role, "unknown role; denying");
            return Decision::deny(DecisionBasis::UnknownRole);
        };
        if role == Role::SuperAdmin {
            return Decision::allow(DecisionBasis::SuperAdmin);
        }

        if let Err(err) = self.ensure_initialized().await {
            warn!(error = %err, "seeding default permissions failed; using built-in defaults");
            return self.fallback(user, role, action, resource, owner, true);
        }

        let key = PermissionKey::new(role, resource, action);
        let decision = match self.bounded(self.store.get_permission(key)).await {
            Err(err) => {
                warn!(%key, error = %err, "permission store unavailable; using built-in defaults");
                return self.fallback(user, role, action, resource, owner, false);
            }
            Ok(None) => Decision::deny(DecisionBasis::NotStored),
            Ok(Some(false)) => Decision::deny(DecisionBasis::StoredDenied),
            Ok(Some(true)) => {
                if owner_scope_permits(user.id, role, action, resource, owner) {
                    Decision::allow(DecisionBasis::Stored)
                } else {
                    Decision::deny(DecisionBasis::OwnerMismatch)
                }
            }
        };

        debug!(
            user_id = %user.id,
            %key,
            %owner,
            allowed = decision.allowed,
            basis = ?decision.basis,
            "policy decision"
        );
        decision
    }

    fn fallback(
        &self,
        user: &AuthUser,
        role: Role,
        action: Action,
        resource: Resource,
        owner: OwnerId,
        seed_failed: bool,
    ) -> Decision {
        let basis = DecisionBasis::Fallback { seed_failed };
        if decide_from_defaults(user.id, role, action, resource, owner) {
            Decision::allow(basis)
        } else {
            Decision::deny(basis)
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, PermissionStoreError>
    where
        F: Future<Output = Result<T, PermissionStoreError>>,
    {
        match self.config.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| PermissionStoreError::Timeout(limit))?,
            None => fut.await,
        }
    }
}
