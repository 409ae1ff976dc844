//! Startup provisioning of built-in accounts.

use chrono::{DateTime, Utc};

use revdesk_auth::{AccountStatus, Identity, NewIdentity, RoleLevel, hash_password};
use revdesk_core::DomainResult;

use crate::store::{IdentityStore, StoreError};

/// An account created at startup if its username is free.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedAccount {
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub role: RoleLevel,
    pub password: String,
}

impl SeedAccount {
    /// The built-in super-admin, `admin`.
    pub fn admin(password: impl Into<String>) -> Self {
        Self {
            username: "admin".to_string(),
            nickname: "admin".to_string(),
            email: "admin@example.com".to_string(),
            role: RoleLevel::SUPER_ADMIN,
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for SeedAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeedAccount")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Insert each seed account. Existing usernames are skipped, so running
/// this on every start is idempotent. Returns the number inserted.
pub fn seed_identities<S>(
    store: &S,
    accounts: &[SeedAccount],
    now: DateTime<Utc>,
) -> DomainResult<usize>
where
    S: IdentityStore + ?Sized,
{
    let mut inserted = 0;
    for account in accounts {
        let new = NewIdentity {
            username: account.username.clone(),
            password_hash: hash_password(&account.password)?,
            nickname: account.nickname.clone(),
            email: account.email.clone(),
            role: account.role,
            avatar: Identity::DEFAULT_AVATAR.to_string(),
            bio: String::new(),
            website: String::new(),
            status: AccountStatus::Active,
        };

        match store.insert(new, now) {
            Ok(identity) => {
                tracing::info!(user_id = %identity.id, username = %identity.username, role = %identity.role, "seeded account");
                inserted += 1;
            }
            Err(StoreError::Conflict(_)) => {
                tracing::debug!(username = %account.username, "seed account already present");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use revdesk_auth::verify_password;

    use crate::store::InMemoryIdentityStore;

    #[test]
    fn seeding_twice_is_idempotent() {
        let store = InMemoryIdentityStore::new();
        let accounts = [SeedAccount::admin("s3cret")];

        assert_eq!(seed_identities(&store, &accounts, Utc::now()).unwrap(), 1);
        assert_eq!(seed_identities(&store, &accounts, Utc::now()).unwrap(), 0);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn seeded_admin_is_super_admin_with_hashed_password() {
        let store = InMemoryIdentityStore::new();
        seed_identities(&store, &[SeedAccount::admin("s3cret")], Utc::now()).unwrap();

        let admin = store.find_by_username("admin").unwrap().unwrap();
        assert_eq!(admin.role, RoleLevel::SUPER_ADMIN);
        assert_ne!(admin.password_hash, "s3cret");
        assert!(verify_password("s3cret", &admin.password_hash));
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", SeedAccount::admin("s3cret"));
        assert!(!rendered.contains("s3cret"));
    }
}
