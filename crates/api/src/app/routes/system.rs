use axum::{extract::Extension, response::IntoResponse, Json};
use serde_json::json;

use crate::context::UserContext;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn whoami(Extension(user): Extension<UserContext>) -> impl IntoResponse {
    Json(json!({
        "user_id": user.user_id().get(),
        "role": user.user().role,
        "known_role": user.role().is_some(),
    }))
}
