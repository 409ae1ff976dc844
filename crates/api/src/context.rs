use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use revdesk_auth::Caller;
use revdesk_core::DomainError;

use crate::app::errors::ApiError;

/// Verified caller of the current request.
///
/// Only present behind the access guard; extracting it on an unguarded route
/// is a 401.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallerContext(pub Caller);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CallerContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .map(CallerContext)
            .ok_or_else(|| ApiError(DomainError::unauthenticated("authorization token required")))
    }
}
