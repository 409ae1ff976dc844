use serde::{Deserialize, Serialize};

use revdesk_auth::{Caller, RoleLevel};
use revdesk_core::UserId;

// -------------------------
// Requests
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub nickname: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminCreateRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub nickname: String,
    pub email: String,
    pub role: RoleLevel,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub website: String,
}

// -------------------------
// Responses
// -------------------------

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub user: SignedInUser,
}

#[derive(Debug, Serialize)]
pub struct SignedInUser {
    pub id: UserId,
    pub nickname: String,
    pub email: String,
    pub token: String,
    pub role: RoleLevel,
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user_id: UserId,
    pub role: RoleLevel,
    pub role_name: &'static str,
}

impl From<Caller> for WhoAmI {
    fn from(caller: Caller) -> Self {
        Self {
            user_id: caller.user_id(),
            role: caller.role(),
            role_name: caller.role().name(),
        }
    }
}

/// `{ "data": [...] }` envelope for unpaged listings.
#[derive(Debug, Serialize)]
pub struct DataList<T> {
    pub data: Vec<T>,
}
