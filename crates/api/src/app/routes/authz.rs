//! Self-service permission checks for the calling user.
//!
//! Both endpoints take the action/resource as text, so unknown names are
//! answered (denied) rather than rejected.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use skyyard_core::OwnerId;

use crate::app::AppServices;
use crate::context::UserContext;

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub action: String,
    pub resource: String,
    pub owner_id: Option<i64>,
}

impl CheckQuery {
    fn owner(&self) -> OwnerId {
        self.owner_id.map(OwnerId::new).unwrap_or(OwnerId::NONE)
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/check", get(check))
        .route("/explain", get(explain))
}

/// GET /authz/check - `{"allowed": bool}` for the caller
pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<CheckQuery>,
) -> impl IntoResponse {
    let allowed = services
        .engine
        .allow_raw(Some(user.user()), &query.action, &query.resource, query.owner())
        .await;
    Json(json!({ "allowed": allowed }))
}

/// GET /authz/explain - the decision plus why it came out that way
pub async fn explain(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<CheckQuery>,
) -> impl IntoResponse {
    let decision = services
        .engine
        .decide_raw(Some(user.user()), &query.action, &query.resource, query.owner())
        .await;
    Json(json!({
        "allowed": decision.allowed,
        "basis": decision.basis,
        "reason": decision.reason(),
        "user_id": user.user_id().get(),
        "role": user.user().role,
    }))
}
