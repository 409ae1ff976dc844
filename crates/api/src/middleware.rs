use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::MethodRouter,
};
use chrono::Utc;

use revdesk_auth::{AuthzError, RoleLevel, TokenError, TokenService, authenticate};

use crate::app::errors::ApiError;

/// Route-bound access requirement.
#[derive(Clone)]
pub struct AccessGuard {
    pub tokens: Arc<TokenService>,
    pub required: RoleLevel,
}

impl AccessGuard {
    pub fn new(tokens: Arc<TokenService>, required: RoleLevel) -> Self {
        Self { tokens, required }
    }
}

/// Verify the request's token against the route's role and attach the
/// resulting [`revdesk_auth::Caller`] to the request extensions.
pub async fn require_role(
    State(guard): State<AccessGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| {
            AuthzError::InvalidToken(TokenError::Malformed(
                "authorization header is not visible ASCII".to_string(),
            ))
        })?),
        None => None,
    };

    let caller = authenticate(&guard.tokens, header, guard.required, Utc::now())?;

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Bind `route` to `required`: the handler only runs for callers at least
/// that privileged.
pub fn guarded<S>(tokens: &Arc<TokenService>, required: RoleLevel, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(from_fn_with_state(
        AccessGuard::new(tokens.clone(), required),
        require_role,
    ))
}
