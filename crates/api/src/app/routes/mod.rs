use axum::{Router, routing::get};

pub mod ledger;
pub mod system;

/// Router for all authenticated (organization-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/ledger", ledger::router())
}
