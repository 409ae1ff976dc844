use std::sync::Arc;

use axum::{Router, routing::get};

use revdesk_auth::{RoleLevel, TokenService};

use crate::middleware::guarded;

pub mod revenue;
pub mod system;
pub mod users;

/// Router for everything under `/api`. Each route carries its own role.
pub fn router(tokens: &Arc<TokenService>) -> Router {
    Router::new()
        .route("/whoami", guarded(tokens, RoleLevel::USER, get(system::whoami)))
        .nest("/user", users::router(tokens))
        .nest("/employee-revenue", revenue::router(tokens))
}
