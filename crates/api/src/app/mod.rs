//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: identity and revenue operations over the stores
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router, routing::get};
use chrono::Utc;
use tower::ServiceBuilder;

use revdesk_auth::TokenService;
use revdesk_infra::seed_identities;

use crate::config::ApiConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router over fresh in-memory stores, seeding the
/// configured accounts (public entrypoint used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let tokens = Arc::new(TokenService::new(config.auth()));
    let services = AppServices::in_memory(tokens);

    let seeded = seed_identities(services.identities(), config.seed_accounts(), Utc::now())
        .context("failed to seed accounts")?;
    tracing::info!(seeded, "account seeding complete");

    Ok(router(Arc::new(services)))
}

/// Router over already-built services.
pub fn router(services: Arc<AppServices>) -> Router {
    let api = routes::router(services.tokens());

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
