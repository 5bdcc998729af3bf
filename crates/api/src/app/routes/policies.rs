//! Policy administration endpoints (the permission matrix screen).

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;

use skyyard_auth::{Action, PermissionKey, Resource};

use crate::app::{errors, AppServices};
use crate::authz::require_permission;
use crate::context::UserContext;

#[derive(Debug, Deserialize)]
pub struct GrantedCell {
    pub role: String,
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveMatrixRequest {
    #[serde(default)]
    pub granted: Vec<GrantedCell>,
}

#[derive(Debug, Deserialize)]
pub struct SetCellRequest {
    pub allowed: bool,
}

pub fn router() -> Router {
    Router::new()
        .route("/policies", get(get_matrix).put(save_matrix))
        .route("/policies/:role/:resource/:action", patch(set_cell))
}

/// GET /admin/policies - every role × resource × action with labels
pub async fn get_matrix(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    if let Err(resp) =
        require_permission(&services, &user, Action::Read, Resource::Policies).await
    {
        return resp;
    }

    match services.admin.matrix().await {
        Ok(matrix) => (StatusCode::OK, Json(matrix)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT /admin/policies - replace the whole matrix with the granted cells
pub async fn save_matrix(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<SaveMatrixRequest>,
) -> axum::response::Response {
    if let Err(resp) =
        require_permission(&services, &user, Action::Update, Resource::Policies).await
    {
        return resp;
    }

    let granted = match body
        .granted
        .iter()
        .map(|c| PermissionKey::parse(&c.role, &c.resource, &c.action))
        .collect::<Result<HashSet<_>, _>>()
    {
        Ok(granted) => granted,
        Err(e) => return errors::parse_error_to_response(e),
    };

    if let Err(e) = services.admin.save_matrix(&granted).await {
        return errors::store_error_to_response(e);
    }
    tracing::info!(user_id = %user.user_id(), granted = granted.len(), "policy matrix replaced");

    match services.admin.matrix().await {
        Ok(matrix) => (StatusCode::OK, Json(matrix)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PATCH /admin/policies/:role/:resource/:action - flip a single cell
pub async fn set_cell(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((role, resource, action)): Path<(String, String, String)>,
    Json(body): Json<SetCellRequest>,
) -> axum::response::Response {
    if let Err(resp) =
        require_permission(&services, &user, Action::Update, Resource::Policies).await
    {
        return resp;
    }

    let key = match PermissionKey::parse(&role, &resource, &action) {
        Ok(key) => key,
        Err(e) => return errors::parse_error_to_response(e),
    };

    match services.admin.set_cell(key, body.allowed).await {
        Ok(entry) => {
            tracing::info!(
                user_id = %user.user_id(),
                %key,
                allowed = entry.allowed,
                "policy cell updated"
            );
            (StatusCode::OK, Json(entry)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
