//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: query strings and response views
//! - `errors.rs`: consistent error responses and page redirects
//! - `extract.rs`: JSON body extractor with structured rejections

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &Config) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(build_router(Arc::new(services)))
}

/// Router over already constructed services.
///
/// Request order: edge gate, then session resolution, then the handler.
pub fn build_router(services: Arc<AppServices>) -> Router {
    routes::router()
        .layer(Extension(services.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(services.clone(), middleware::edge_gate))
                .layer(axum::middleware::from_fn_with_state(services, middleware::session_middleware)),
        )
}
