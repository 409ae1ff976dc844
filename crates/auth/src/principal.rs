use serde::Serialize;

use revdesk_core::UserId;

use crate::{RoleLevel, SessionClaims};

/// The verified caller of a protected operation.
///
/// Produced only by the access guard after a token has been verified and the
/// route's role requirement met; handlers receive it as an explicit argument.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    user_id: UserId,
    role: RoleLevel,
}

impl Caller {
    pub(crate) fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> RoleLevel {
        self.role
    }

    pub fn owns(&self, owner: UserId) -> bool {
        self.user_id == owner
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Caller {
    /// Construct a caller without a token (tests only).
    pub fn for_tests(user_id: UserId, role: RoleLevel) -> Self {
        Self { user_id, role }
    }
}
