//! API-side authorization guard.
//!
//! Handlers call [`require_permission`] before touching the store, so a
//! denied request never reaches the admin layer.

use skyyard_auth::{Action, Resource};
use skyyard_core::OwnerId;

use crate::app::{errors, AppServices};
use crate::context::UserContext;

/// Check that the caller holds `action` on `resource`; 403 otherwise.
pub async fn require_permission(
    services: &AppServices,
    user: &UserContext,
    action: Action,
    resource: Resource,
) -> Result<(), axum::response::Response> {
    let decision = services
        .engine
        .decide(Some(user.user()), action, resource, OwnerId::NONE)
        .await;

    if decision.allowed {
        Ok(())
    } else {
        tracing::info!(
            user_id = %user.user_id(),
            role = %user.user().role,
            %action,
            %resource,
            reason = decision.reason(),
            "request denied"
        );
        Err(errors::forbidden())
    }
}
