//! Credential hashing (Argon2id, PHC string format).

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

use revdesk_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("failed to gather salt entropy: {0}")]
    Entropy(String),

    #[error("failed to hash password: {0}")]
    Hash(String),
}

impl From<CredentialError> for DomainError {
    fn from(value: CredentialError) -> Self {
        DomainError::internal(value.to_string())
    }
}

/// Hash a plaintext password with a fresh random salt.
///
/// Two calls with the same plaintext yield different digests.
pub fn hash_password(plaintext: &str) -> Result<String, CredentialError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| CredentialError::Entropy(e.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| CredentialError::Hash(e.to_string()))?;

    let phc = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| CredentialError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Check a plaintext against a stored digest.
///
/// Returns `false` for a mismatch and for a digest that does not parse.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let digest = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &digest));
        assert!(!verify_password("s3cret-pasS", &digest));
    }

    #[test]
    fn same_plaintext_yields_distinct_digests() {
        let a = hash_password("alice").unwrap();
        let b = hash_password("alice").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("alice", &a));
        assert!(verify_password("alice", &b));
    }

    #[test]
    fn digest_never_contains_plaintext() {
        let digest = hash_password("plain-text-value").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(!digest.contains("plain-text-value"));
    }

    #[test]
    fn malformed_digest_is_a_mismatch() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", "$2a$14$bcryptlookingbutnot"));
    }
}
