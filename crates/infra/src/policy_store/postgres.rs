//! Postgres-backed permission store.
//!
//! Rows live in `policy_permissions` keyed by `(role, resource, action)`; the
//! primary key makes every insert-or-update atomic per key.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PermissionStoreError |
//! |------------|----------------------|
//! | PoolClosed / PoolTimedOut / Io / Tls | `Unavailable` |
//! | Database, decode and everything else | `Query` |
//!
//! Unique violations (`23505`) while seeding are a lost insert race and count
//! as success.
//!
//! ## Legacy spellings
//!
//! Rows written as `internal_super_admin` or `carnumbers` are folded onto the
//! canonical key by `migrate()` and again before every seed, so lookups and
//! listings read the same row. If a legacy row appears in between, `list()`
//! still reports the canonical row, which is the one decisions read.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use sqlx::{Executor, PgPool, Row};
use tracing::{instrument, warn};

use skyyard_auth::{PermissionEntry, PermissionKey};

use super::r#trait::{PermissionStore, PermissionStoreError};

const MIGRATION: &str = include_str!("../../migrations/0001_policy_permissions.sql");
const FOLD_LEGACY: &str = include_str!("../../migrations/0002_fold_legacy_spellings.sql");

/// Postgres-backed permission store.
///
/// ## Thread Safety
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
/// Each call is an independent unit; `ensure_defaults` and `replace_all` open a transaction.
#[derive(Debug, Clone)]
pub struct PostgresPermissionStore {
    pool: Arc<PgPool>,
}

impl PostgresPermissionStore {
    /// Create a new PostgresPermissionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `policy_permissions` table if it does not exist and fold
    /// legacy spellings onto canonical keys.
    pub async fn migrate(&self) -> Result<(), PermissionStoreError> {
        for sql in [MIGRATION, FOLD_LEGACY] {
            sqlx::raw_sql(sql)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PermissionStore for PostgresPermissionStore {
    #[instrument(skip(self, defaults), fields(entry_count = defaults.len()), err)]
    async fn ensure_defaults(
        &self,
        defaults: &[PermissionEntry],
    ) -> Result<(), PermissionStoreError> {
        if defaults.is_empty() {
            return Ok(());
        }

        let mut roles = Vec::with_capacity(defaults.len());
        let mut resources = Vec::with_capacity(defaults.len());
        let mut actions = Vec::with_capacity(defaults.len());
        let mut allowed = Vec::with_capacity(defaults.len());
        for entry in defaults {
            roles.push(entry.key.role.as_str().to_string());
            resources.push(entry.key.resource.as_str().to_string());
            actions.push(entry.key.action.as_str().to_string());
            allowed.push(entry.allowed);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("ensure_defaults", e))?;

        // Canonical rows must exist before the seed, or it would shadow a legacy override.
        (&mut *tx)
            .execute(sqlx::raw_sql(FOLD_LEGACY))
            .await
            .map_err(|e| map_sqlx_error("ensure_defaults", e))?;

        let result = sqlx::query(
            r#"
            INSERT INTO policy_permissions (role, resource, action, allowed, created_at, updated_at)
            SELECT role, resource, action, allowed, $5, $5
            FROM UNNEST($1::text[], $2::text[], $3::text[], $4::bool[])
                AS seed(role, resource, action, allowed)
            ON CONFLICT (role, resource, action) DO NOTHING
            "#,
        )
        .bind(&roles)
        .bind(&resources)
        .bind(&actions)
        .bind(&allowed)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => tx.commit().await.map_err(|e| map_sqlx_error("ensure_defaults", e)),
            Err(e) if is_unique_violation(&e) => Ok(()),
            Err(e) => Err(map_sqlx_error("ensure_defaults", e)),
        }
    }

    #[instrument(
        skip(self),
        fields(role = %key.role, resource = %key.resource, action = %key.action),
        err
    )]
    async fn get_permission(
        &self,
        key: PermissionKey,
    ) -> Result<Option<bool>, PermissionStoreError> {
        let row = sqlx::query(
            r#"
            SELECT allowed
            FROM policy_permissions
            WHERE role = $1 AND resource = $2 AND action = $3
            "#,
        )
        .bind(key.role.as_str())
        .bind(key.resource.as_str())
        .bind(key.action.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_permission", e))?;

        match row {
            Some(row) => row
                .try_get::<bool, _>("allowed")
                .map(Some)
                .map_err(|e| map_sqlx_error("get_permission", e)),
            None => Ok(None),
        }
    }

    #[instrument(
        skip(self),
        fields(role = %key.role, resource = %key.resource, action = %key.action),
        err
    )]
    async fn upsert(&self, key: PermissionKey, allowed: bool) -> Result<(), PermissionStoreError> {
        sqlx::query(UPSERT_SQL)
            .bind(key.role.as_str())
            .bind(key.resource.as_str())
            .bind(key.action.as_str())
            .bind(allowed)
            .bind(Utc::now())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("upsert", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<PermissionEntry>, PermissionStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT role, resource, action, allowed
            FROM policy_permissions
            ORDER BY role, resource, action
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        // Legacy spellings parse to the same key; the canonical row is the one
        // `get_permission` reads, so it wins.
        let mut entries = BTreeMap::new();
        for row in rows {
            let get = |column: &str| {
                row.try_get::<String, _>(column).map_err(|e| map_sqlx_error("list", e))
            };
            let (role, resource, action) = (get("role")?, get("resource")?, get("action")?);
            let allowed: bool = row.try_get("allowed").map_err(|e| map_sqlx_error("list", e))?;

            let key = match PermissionKey::parse(&role, &resource, &action) {
                Ok(key) => key,
                Err(err) => {
                    warn!(%role, %resource, %action, "skipping policy row: {err}");
                    continue;
                }
            };
            let canonical = role == key.role.as_str()
                && resource == key.resource.as_str()
                && action == key.action.as_str();
            if canonical {
                entries.insert(key, allowed);
            } else {
                warn!(%role, %resource, %action, "policy row uses a legacy spelling");
                entries.entry(key).or_insert(allowed);
            }
        }

        Ok(entries
            .into_iter()
            .map(|(key, allowed)| PermissionEntry::new(key, allowed))
            .collect())
    }

    #[instrument(skip(self, entries), fields(entry_count = entries.len()), err)]
    async fn replace_all(&self, entries: &[PermissionEntry]) -> Result<(), PermissionStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("replace_all", e))?;

        let now = Utc::now();
        for entry in entries {
            sqlx::query(UPSERT_SQL)
                .bind(entry.key.role.as_str())
                .bind(entry.key.resource.as_str())
                .bind(entry.key.action.as_str())
                .bind(entry.allowed)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("replace_all", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("replace_all", e))
    }
}

const UPSERT_SQL: &str = r#"
    INSERT INTO policy_permissions (role, resource, action, allowed, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $5)
    ON CONFLICT (role, resource, action)
    DO UPDATE SET allowed = EXCLUDED.allowed, updated_at = EXCLUDED.updated_at
"#;

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> PermissionStoreError {
    match err {
        sqlx::Error::PoolClosed => {
            PermissionStoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            PermissionStoreError::Unavailable(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::Io(e) => {
            PermissionStoreError::Unavailable(format!("io error in {operation}: {e}"))
        }
        sqlx::Error::Tls(e) => {
            PermissionStoreError::Unavailable(format!("tls error in {operation}: {e}"))
        }
        sqlx::Error::Database(db_err) => PermissionStoreError::Query(format!(
            "database error in {operation}: {}",
            db_err.message()
        )),
        other => PermissionStoreError::Query(format!("sqlx error in {operation}: {other}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
