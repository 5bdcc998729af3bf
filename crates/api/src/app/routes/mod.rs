use axum::{routing::get, Router};

pub mod authz;
pub mod policies;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/authz", authz::router())
        .nest("/admin", policies::router())
}
