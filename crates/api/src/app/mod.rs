//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection, ledger engine, audit sink
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and mapping to ledger types
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use wolfshield_infra::{AppConfig, LedgerStoreError};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, LedgerStoreError> {
    let services = services::build_services(config).await?;
    Ok(router(Arc::new(services), config.jwt_secret.clone()))
}

/// Router over already-built services (tests inject their own store/audit sink).
pub fn router(services: Arc<AppServices>, jwt_secret: String) -> Router {
    let jwt = Arc::new(wolfshield_auth::Hs256JwtValidator::new(jwt_secret.into_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require auth + organization context.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
