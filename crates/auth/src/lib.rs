//! `revdesk-auth` — credentials, session tokens and the role hierarchy.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod identity;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;

pub use authorize::{AuthzError, authenticate, authorize, extract_token};
pub use claims::{SessionClaims, TokenError, validate_claims};
pub use config::AuthConfig;
pub use identity::{
    AccountStatus, AdminUpdate, Identity, IdentityView, NewIdentity, ProfileUpdate,
};
pub use password::{CredentialError, hash_password, verify_password};
pub use principal::Caller;
pub use roles::{RoleLevel, UnknownRoleLevel};
pub use token::TokenService;
