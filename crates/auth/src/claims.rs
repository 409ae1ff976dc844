use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use revdesk_core::{DomainError, UserId};

use crate::RoleLevel;

/// Session claim carried inside a signed token.
///
/// Nothing is stored server-side: every request re-derives validity from these
/// fields alone. `role` is the holder's level at mint time; a later downgrade
/// only takes effect after the holder signs in again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the holder id rendered as a string.
    pub sub: String,

    /// Holder id.
    pub user_id: UserId,

    /// Role level at mint time.
    pub role: RoleLevel,

    pub iss: String,
    pub aud: String,

    /// Token instance id.
    pub jti: Uuid,

    /// Issued-at (unix seconds).
    pub iat: i64,

    /// Expiry (unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    pub fn subject_id(&self) -> UserId {
        self.user_id
    }

    pub fn role_level(&self) -> RoleLevel {
        self.role
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for DomainError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Expired | TokenError::Malformed(_) => {
                DomainError::unauthenticated(value.to_string())
            }
            TokenError::Signing(_) => DomainError::internal(value.to_string()),
        }
    }
}

/// Deterministically validate the time window of decoded claims.
///
/// Expiry is an exact comparison: a token checked at its expiry second is
/// still accepted, one second later it is not.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.exp <= claims.iat {
        return Err(TokenError::Malformed(
            "invalid token time window (exp <= iat)".to_string(),
        ));
    }
    if claims.sub != claims.user_id.to_string() {
        return Err(TokenError::Malformed("subject does not match holder".to_string()));
    }
    if now.timestamp() > claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(iat: i64, exp: i64) -> SessionClaims {
        SessionClaims {
            sub: "7".to_string(),
            user_id: UserId::new(7),
            role: RoleLevel::MARKETER,
            iss: "revdesk".to_string(),
            aud: "revdesk-web".to_string(),
            jti: Uuid::now_v7(),
            iat,
            exp,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn accepts_up_to_and_including_expiry_second() {
        let c = claims(1_000, 2_000);
        assert_eq!(validate_claims(&c, at(1_999)), Ok(()));
        assert_eq!(validate_claims(&c, at(2_000)), Ok(()));
        assert_eq!(validate_claims(&c, at(2_001)), Err(TokenError::Expired));
    }

    #[test]
    fn inverted_window_is_malformed() {
        let c = claims(2_000, 2_000);
        assert!(matches!(
            validate_claims(&c, at(1_500)),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn subject_mismatch_is_malformed() {
        let mut c = claims(1_000, 2_000);
        c.sub = "8".to_string();
        assert!(matches!(
            validate_claims(&c, at(1_500)),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn token_errors_map_to_taxonomy() {
        assert!(matches!(
            DomainError::from(TokenError::Expired),
            DomainError::Unauthenticated(_)
        ));
        assert!(matches!(
            DomainError::from(TokenError::Signing("boom".into())),
            DomainError::Internal(_)
        ));
    }
}
