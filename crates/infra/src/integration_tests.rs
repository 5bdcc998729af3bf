//! End-to-end decision scenarios over the in-memory store.
//!
//! Tests: seeding → store lookups → owner scoping → admin edits → fallback.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use proptest::prelude::*;

    use skyyard_auth::{
        Action, AuthUser, Decision, DecisionBasis, PermissionEntry, PermissionKey, Resource, Role,
        default_permissions,
    };
    use skyyard_core::{OwnerId, UserId};

    use crate::policy::{PolicyAdmin, PolicyEngine};
    use crate::policy_store::{InMemoryPermissionStore, PermissionStore, PermissionStoreError};

    /// A store whose database is gone.
    struct DownStore;

    #[async_trait::async_trait]
    impl PermissionStore for DownStore {
        async fn ensure_defaults(
            &self,
            _defaults: &[PermissionEntry],
        ) -> Result<(), PermissionStoreError> {
            Err(PermissionStoreError::Unavailable("connection refused".to_string()))
        }

        async fn get_permission(
            &self,
            _key: PermissionKey,
        ) -> Result<Option<bool>, PermissionStoreError> {
            Err(PermissionStoreError::Unavailable("connection refused".to_string()))
        }

        async fn upsert(
            &self,
            _key: PermissionKey,
            _allowed: bool,
        ) -> Result<(), PermissionStoreError> {
            Err(PermissionStoreError::Unavailable("connection refused".to_string()))
        }

        async fn list(&self) -> Result<Vec<PermissionEntry>, PermissionStoreError> {
            Err(PermissionStoreError::Unavailable("connection refused".to_string()))
        }

        async fn replace_all(
            &self,
            _entries: &[PermissionEntry],
        ) -> Result<(), PermissionStoreError> {
            Err(PermissionStoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime")
    }

    fn user(id: i64, role: Role) -> AuthUser {
        AuthUser::with_role(UserId::new(id), role)
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn any_action() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    fn any_resource() -> impl Strategy<Value = Resource> {
        prop::sample::select(Resource::ALL.to_vec())
    }

    fn owner_scoped_resource() -> impl Strategy<Value = Resource> {
        prop::sample::select(vec![Resource::Containers, Resource::BlMarkings, Resource::Reports])
    }

    #[tokio::test]
    async fn admin_cannot_delete_policies_by_default() {
        let engine = PolicyEngine::new(InMemoryPermissionStore::new());
        let admin = user(2, Role::Admin);
        assert!(
            !engine
                .allow(Some(&admin), Action::Delete, Resource::Policies, OwnerId::NONE)
                .await
        );
    }

    #[tokio::test]
    async fn staff_updates_own_report_on_first_call() {
        let engine = PolicyEngine::new(InMemoryPermissionStore::new());
        let staff = user(42, Role::Staff);
        assert!(!engine.is_seeded());
        assert!(
            engine
                .allow(Some(&staff), Action::Update, Resource::Reports, OwnerId::new(42))
                .await
        );
        assert!(engine.is_seeded());
    }

    #[tokio::test]
    async fn staff_cannot_update_someone_elses_report_even_when_granted() {
        let store = Arc::new(InMemoryPermissionStore::new());
        let engine = PolicyEngine::new(store.clone());
        let admin = PolicyAdmin::new(store.clone());
        let staff = user(7, Role::Staff);

        for allowed in [true, false] {
            let key = PermissionKey::new(Role::Staff, Resource::Reports, Action::Update);
            admin.set_cell(key, allowed).await.unwrap();
            assert!(
                !engine
                    .allow(Some(&staff), Action::Update, Resource::Reports, OwnerId::new(42))
                    .await
            );
        }
    }

    #[tokio::test]
    async fn saved_matrix_takes_effect_immediately() {
        let store = Arc::new(InMemoryPermissionStore::new());
        let engine = PolicyEngine::new(store.clone());
        let admin = PolicyAdmin::new(store.clone());
        let supplier = user(11, Role::Supplier);

        assert!(
            engine
                .allow(Some(&supplier), Action::Read, Resource::SupplierPortal, OwnerId::NONE)
                .await
        );

        admin.save_matrix(&HashSet::new()).await.unwrap();
        assert!(
            !engine
                .allow(Some(&supplier), Action::Read, Resource::SupplierPortal, OwnerId::NONE)
                .await
        );

        let root = user(1, Role::SuperAdmin);
        assert!(
            engine
                .allow(Some(&root), Action::Delete, Resource::Policies, OwnerId::NONE)
                .await
        );
    }

    #[tokio::test]
    async fn concurrent_first_use_writes_each_key_once() {
        let store = Arc::new(InMemoryPermissionStore::new());
        let engine = Arc::new(PolicyEngine::new(store.clone()));

        let mut handles = Vec::new();
        for id in 1..=8 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                let staff = user(id, Role::Staff);
                engine
                    .allow(Some(&staff), Action::Read, Resource::Containers, OwnerId::NONE)
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(store.len().unwrap(), default_permissions().len());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: super-admin is allowed everywhere, even against explicit stored denials.
        #[test]
        fn super_admin_always_allowed(
            action in any_action(),
            resource in any_resource(),
            owner in -10i64..100,
        ) {
            let rt = runtime();
            let allowed = rt.block_on(async {
                let store = Arc::new(InMemoryPermissionStore::new());
                let key = PermissionKey::new(Role::SuperAdmin, resource, action);
                store.upsert(key, false).await.unwrap();
                let engine = PolicyEngine::new(store);
                let root = user(1, Role::SuperAdmin);
                engine.allow(Some(&root), action, resource, OwnerId::new(owner)).await
            });
            prop_assert!(allowed);
        }

        /// Property: suppliers only ever read the supplier portal.
        #[test]
        fn supplier_confined_to_portal(action in any_action(), resource in any_resource()) {
            let rt = runtime();
            let allowed = rt.block_on(async {
                let engine = PolicyEngine::new(InMemoryPermissionStore::new());
                let supplier = user(5, Role::Supplier);
                engine.allow(Some(&supplier), action, resource, OwnerId::NONE).await
            });
            let portal_read = resource == Resource::SupplierPortal && action == Action::Read;
            prop_assert_eq!(allowed, portal_read);
        }

        /// Property: with the store down, decisions equal those over a store holding
        /// exactly the defaults.
        #[test]
        fn fallback_matches_seeded_defaults(
            role in any_role(),
            action in any_action(),
            resource in any_resource(),
            user_id in 1i64..50,
            owner in -2i64..50,
        ) {
            let rt = runtime();
            let (seeded, fallback) = rt.block_on(async {
                let caller = user(user_id, role);
                let seeded = PolicyEngine::new(InMemoryPermissionStore::new());
                let down = PolicyEngine::new(DownStore);
                (
                    seeded.allow(Some(&caller), action, resource, OwnerId::new(owner)).await,
                    down.allow(Some(&caller), action, resource, OwnerId::new(owner)).await,
                )
            });
            prop_assert_eq!(seeded, fallback);
        }

        /// Property: a stored grant never lets staff mutate another user's owner-scoped record.
        #[test]
        fn staff_owner_scope_survives_overrides(
            user_id in 1i64..50,
            owner in -2i64..50,
            delete in any::<bool>(),
            resource in owner_scoped_resource(),
        ) {
            let action = if delete { Action::Delete } else { Action::Update };
            let rt = runtime();
            let allowed = rt.block_on(async {
                let store = Arc::new(InMemoryPermissionStore::new());
                let engine = PolicyEngine::new(store.clone());
                engine.ensure_initialized().await.unwrap();
                let key = PermissionKey::new(Role::Staff, resource, action);
                store.upsert(key, true).await.unwrap();
                let staff = user(user_id, Role::Staff);
                engine.allow(Some(&staff), action, resource, OwnerId::new(owner)).await
            });
            prop_assert_eq!(allowed, owner > 0 && owner == user_id);
        }

        /// Property: staff read and create owner-scoped records whoever owns them,
        /// both from the seeded store and from the fallback.
        #[test]
        fn staff_read_create_ignore_owner(
            user_id in 1i64..50,
            owner in -2i64..50,
            create in any::<bool>(),
            resource in owner_scoped_resource(),
        ) {
            prop_assume!(owner != user_id);
            let action = if create { Action::Create } else { Action::Read };
            let rt = runtime();
            let (stored, fallback) = rt.block_on(async {
                let staff = user(user_id, Role::Staff);
                let owner = OwnerId::new(owner);
                let seeded = PolicyEngine::new(InMemoryPermissionStore::new());
                let down = PolicyEngine::new(DownStore);
                (
                    seeded.decide(Some(&staff), action, resource, owner).await,
                    down.decide(Some(&staff), action, resource, owner).await,
                )
            });
            prop_assert_eq!(stored, Decision::allow(DecisionBasis::Stored));
            let degraded = DecisionBasis::Fallback { seed_failed: true };
            prop_assert_eq!(fallback, Decision::allow(degraded));
        }
    }
}
