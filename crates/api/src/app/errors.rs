use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use skyyard_auth::ParseError;
use skyyard_infra::PermissionStoreError;

pub fn forbidden() -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", "permission denied")
}

pub fn store_error_to_response(err: PermissionStoreError) -> axum::response::Response {
    tracing::error!(error = %err, "permission store error");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}

pub fn parse_error_to_response(err: ParseError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
