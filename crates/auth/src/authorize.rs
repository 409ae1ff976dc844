//! Per-request access decision.
//!
//! Transport-agnostic: callers hand in the raw `Authorization` header value
//! (if any) and the role bound to the route; the result is either a verified
//! [`Caller`] or the reason for rejection.

use chrono::{DateTime, Utc};
use thiserror::Error;

use revdesk_core::DomainError;

use crate::claims::TokenError;
use crate::principal::Caller;
use crate::roles::RoleLevel;
use crate::token::TokenService;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authorization token required")]
    MissingToken,

    #[error("invalid authorization token: {0}")]
    InvalidToken(TokenError),

    #[error("insufficient permissions: role {actual} does not satisfy {required}")]
    InsufficientRole {
        required: RoleLevel,
        actual: RoleLevel,
    },
}

impl From<AuthzError> for DomainError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::MissingToken | AuthzError::InvalidToken(_) => {
                DomainError::unauthenticated(value.to_string())
            }
            AuthzError::InsufficientRole { .. } => DomainError::forbidden(value.to_string()),
        }
    }
}

/// Pull the token out of an `Authorization` header value.
///
/// `Bearer <token>` (any casing of `bearer`) yields `<token>`; every other
/// shape is taken verbatim as the raw token. Returns `None` only for an
/// empty value.
pub fn extract_token(header: &str) -> Option<&str> {
    if header.is_empty() {
        return None;
    }

    let mut parts = header.split(' ');
    if let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) {
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(token);
        }
    }
    Some(header)
}

/// Role check: the caller's level must be at least as privileged as `required`.
pub fn authorize(caller: &Caller, required: RoleLevel) -> Result<(), AuthzError> {
    if caller.role().at_least_as_privileged_as(required) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole {
            required,
            actual: caller.role(),
        })
    }
}

/// Full guard: header → token → claims → role check → [`Caller`].
///
/// - No IO
/// - No panics
pub fn authenticate(
    tokens: &TokenService,
    header: Option<&str>,
    required: RoleLevel,
    now: DateTime<Utc>,
) -> Result<Caller, AuthzError> {
    let token = header
        .and_then(extract_token)
        .ok_or(AuthzError::MissingToken)?;

    let claims = tokens.verify(token, now).map_err(|e| {
        tracing::debug!(error = %e, "session token rejected");
        AuthzError::InvalidToken(e)
    })?;

    let caller = Caller::from_claims(&claims);
    authorize(&caller, required).inspect_err(|_| {
        tracing::debug!(
            user_id = %caller.user_id(),
            role = %caller.role(),
            required = %required,
            "role check failed"
        );
    })?;
    Ok(caller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Duration;
    use revdesk_core::UserId;

    use crate::config::AuthConfig;
    use crate::identity::{AccountStatus, Identity};

    fn tokens() -> TokenService {
        TokenService::new(Arc::new(AuthConfig::with_defaults(
            "guard-secret",
            "revdesk",
            "revdesk-web",
        )))
    }

    fn identity(role: RoleLevel) -> Identity {
        let now = Utc::now();
        Identity {
            id: UserId::new(21),
            username: "guarded".to_string(),
            password_hash: String::new(),
            nickname: "Guarded".to_string(),
            email: "guarded@example.com".to_string(),
            role,
            avatar: Identity::DEFAULT_AVATAR.to_string(),
            bio: String::new(),
            website: String::new(),
            last_login_at: None,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn extracts_bearer_and_bare_tokens() {
        assert_eq!(extract_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_token("bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_token("BEARER abc.def"), Some("abc.def"));
        assert_eq!(extract_token("abc.def"), Some("abc.def"));
        assert_eq!(extract_token("Token abc.def"), Some("Token abc.def"));
        assert_eq!(extract_token("Bearer a b"), Some("Bearer a b"));
        assert_eq!(extract_token(""), None);
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        let err = authenticate(&tokens(), None, RoleLevel::USER, Utc::now()).unwrap_err();
        assert_eq!(err, AuthzError::MissingToken);
        assert!(matches!(DomainError::from(err), DomainError::Unauthenticated(_)));
    }

    #[test]
    fn bad_token_is_unauthenticated() {
        let err = authenticate(&tokens(), Some("Bearer nope"), RoleLevel::USER, Utc::now())
            .unwrap_err();
        assert!(matches!(err, AuthzError::InvalidToken(TokenError::Malformed(_))));
    }

    #[test]
    fn expired_token_is_unauthenticated() {
        let svc = tokens();
        let minted = Utc::now() - Duration::hours(25);
        let token = svc.issue(&identity(RoleLevel::USER), minted).unwrap();
        let err = authenticate(&svc, Some(&token), RoleLevel::USER, Utc::now()).unwrap_err();
        assert_eq!(err, AuthzError::InvalidToken(TokenError::Expired));
    }

    #[test]
    fn insufficient_role_is_forbidden() {
        let svc = tokens();
        let now = Utc::now();
        let token = svc.issue(&identity(RoleLevel::USER), now).unwrap();
        let header = format!("Bearer {token}");

        let err = authenticate(&svc, Some(&header), RoleLevel::FINANCE, now).unwrap_err();
        assert_eq!(
            err,
            AuthzError::InsufficientRole {
                required: RoleLevel::FINANCE,
                actual: RoleLevel::USER,
            }
        );
        assert!(matches!(DomainError::from(err), DomainError::Forbidden(_)));
    }

    #[test]
    fn sufficient_role_yields_caller() {
        let svc = tokens();
        let now = Utc::now();
        let token = svc.issue(&identity(RoleLevel::SUPER_ADMIN), now).unwrap();

        for required in RoleLevel::ALL {
            let caller = authenticate(&svc, Some(&token), required, now).unwrap();
            assert_eq!(caller.user_id(), UserId::new(21));
            assert_eq!(caller.role(), RoleLevel::SUPER_ADMIN);
        }
    }
}
