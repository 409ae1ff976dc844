//! Domain error model.

use thiserror::Error;

/// Result type used across the service layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Error taxonomy shared by every crate.
///
/// Failures are resolved into one of these kinds at the point of detection;
/// the HTTP layer maps each kind onto exactly one status code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing, invalid or expired credentials/token.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Valid identity, insufficient role (or not the owner).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed body, unparseable date, failed field validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No matching record.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate unique key.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Hashing, signing or storage failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Discriminant of [`DomainError`], handy for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    InvalidInput,
    NotFound,
    Conflict,
    Internal,
}

impl DomainError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            DomainError::Forbidden(_) => ErrorKind::Forbidden,
            DomainError::InvalidInput(_) => ErrorKind::InvalidInput,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            DomainError::Unauthenticated(m)
            | DomainError::Forbidden(m)
            | DomainError::InvalidInput(m)
            | DomainError::NotFound(m)
            | DomainError::Conflict(m)
            | DomainError::Internal(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(DomainError::conflict("dup").kind(), ErrorKind::Conflict);
        assert_eq!(DomainError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(
            DomainError::unauthenticated("no token").kind(),
            ErrorKind::Unauthenticated
        );
    }

    #[test]
    fn message_strips_kind_prefix() {
        let err = DomainError::invalid_input("bad date");
        assert_eq!(err.message(), "bad date");
        assert_eq!(err.to_string(), "invalid input: bad date");
    }
}
