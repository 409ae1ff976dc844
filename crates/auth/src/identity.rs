//! Identity model (principals that can sign in).
//!
//! The password digest never leaves this crate's types in serialized form:
//! [`IdentityView`] is what gets rendered to clients.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use revdesk_core::{DomainError, DomainResult, UserId};

use crate::RoleLevel;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{4,20}$").expect("static username regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static email regex")
});

/// Account status flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Can sign in.
    #[default]
    Active,
    /// Sign-in is refused; existing tokens stay valid until they expire.
    Disabled,
}

/// A principal as persisted by the identity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub email: String,
    pub role: RoleLevel,
    pub avatar: String,
    pub bio: String,
    pub website: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub const DEFAULT_AVATAR: &'static str = "default_avatar.png";

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    pub fn view(&self) -> IdentityView {
        IdentityView {
            id: self.id,
            username: self.username.clone(),
            nickname: self.nickname.clone(),
            email: self.email.clone(),
            role: self.role,
            avatar: self.avatar.clone(),
            bio: self.bio.clone(),
            website: self.website.clone(),
            last_login_at: self.last_login_at,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Client-facing rendering of an identity (no digest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityView {
    pub id: UserId,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub role: RoleLevel,
    pub avatar: String,
    pub bio: String,
    pub website: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create an identity; the store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub email: String,
    pub role: RoleLevel,
    pub avatar: String,
    pub bio: String,
    pub website: String,
    pub status: AccountStatus,
}

impl NewIdentity {
    pub fn into_identity(self, id: UserId, now: DateTime<Utc>) -> Identity {
        Identity {
            id,
            username: self.username,
            password_hash: self.password_hash,
            nickname: self.nickname,
            email: self.email,
            role: self.role,
            avatar: if self.avatar.is_empty() {
                Identity::DEFAULT_AVATAR.to_string()
            } else {
                self.avatar
            },
            bio: self.bio,
            website: self.website,
            last_login_at: None,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Self-service profile edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    pub fn apply(self, identity: &mut Identity, now: DateTime<Utc>) {
        if let Some(v) = self.username {
            identity.username = v;
        }
        if let Some(v) = self.email {
            identity.email = v;
        }
        if let Some(v) = self.avatar {
            identity.avatar = v;
        }
        if let Some(v) = self.bio {
            identity.bio = v;
        }
        if let Some(v) = self.website {
            identity.website = v;
        }
        identity.updated_at = now;
    }
}

/// Administrative edit of another identity. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdminUpdate {
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub role: Option<RoleLevel>,
    pub status: Option<AccountStatus>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
}

impl AdminUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(role) = self.role {
            validate_assignable_role(role)?;
        }
        Ok(())
    }

    pub fn apply(self, identity: &mut Identity, now: DateTime<Utc>) {
        if let Some(v) = self.nickname {
            identity.nickname = v;
        }
        if let Some(v) = self.email {
            identity.email = v;
        }
        if let Some(v) = self.role {
            identity.role = v;
        }
        if let Some(v) = self.status {
            identity.status = v;
        }
        if let Some(v) = self.avatar {
            identity.avatar = v;
        }
        if let Some(v) = self.bio {
            identity.bio = v;
        }
        if let Some(v) = self.website {
            identity.website = v;
        }
        identity.updated_at = now;
    }
}

pub fn validate_username(username: &str) -> DomainResult<()> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(DomainError::invalid_input(
            "username must be 4-20 characters of letters, digits, '_' or '-'",
        ))
    }
}

pub fn validate_email(email: &str) -> DomainResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(DomainError::invalid_input("email address is not valid"))
    }
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.is_empty() {
        return Err(DomainError::invalid_input("password cannot be empty"));
    }
    Ok(())
}

/// Roles an administrator may hand out: anything below super-admin.
pub fn validate_assignable_role(role: RoleLevel) -> DomainResult<()> {
    if role.at_least_as_privileged_as(RoleLevel::SUPER_ADMIN) {
        return Err(DomainError::invalid_input(format!(
            "role {role} cannot be assigned"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> Identity {
        NewIdentity {
            username: "alice".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            nickname: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: RoleLevel::USER,
            avatar: String::new(),
            bio: String::new(),
            website: String::new(),
            status: AccountStatus::Active,
        }
        .into_identity(UserId::new(1), now)
    }

    #[test]
    fn usernames_follow_handle_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a_b-c1").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(21)).is_err());
    }

    #[test]
    fn emails_need_domain_and_tld() {
        assert!(validate_email("bob@example.com").is_ok());
        assert!(validate_email("bob@example").is_err());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn super_admin_is_not_assignable() {
        assert!(validate_assignable_role(RoleLevel::SUPER_ADMIN).is_err());
        assert!(validate_assignable_role(RoleLevel::FINANCE).is_ok());
        assert!(validate_assignable_role(RoleLevel::USER).is_ok());
    }

    #[test]
    fn new_identity_gets_default_avatar() {
        let identity = sample(Utc::now());
        assert_eq!(identity.avatar, Identity::DEFAULT_AVATAR);
        assert!(identity.is_active());
    }

    #[test]
    fn view_omits_password_hash() {
        let identity = sample(Utc::now());
        let json = serde_json::to_value(identity.view()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], 4);
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn profile_update_touches_only_supplied_fields() {
        let now = Utc::now();
        let mut identity = sample(now);
        ProfileUpdate {
            bio: Some("hello".to_string()),
            ..Default::default()
        }
        .apply(&mut identity, now);

        assert_eq!(identity.bio, "hello");
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.email, "alice@example.com");
    }

    #[test]
    fn admin_update_rejects_super_admin_promotion() {
        let update = AdminUpdate {
            role: Some(RoleLevel::SUPER_ADMIN),
            ..Default::default()
        };
        assert!(matches!(update.validate(), Err(DomainError::InvalidInput(_))));
    }
}
