use chrono::Duration;

/// Token signing configuration.
///
/// Built once at startup and shared read-only (behind an `Arc`) by the token
/// service and the request guard. Changing any field invalidates every token
/// issued under the previous value.
#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
    issuer: String,
    audience: String,
    validity: Duration,
}

impl AuthConfig {
    pub const DEFAULT_VALIDITY_HOURS: i64 = 24;

    pub fn new(
        secret: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        validity: Duration,
    ) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            validity,
        }
    }

    /// Config with the default 24 hour validity window.
    pub fn with_defaults(
        secret: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self::new(
            secret,
            issuer,
            audience,
            Duration::hours(Self::DEFAULT_VALIDITY_HOURS),
        )
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("validity", &self.validity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secret() {
        let cfg = AuthConfig::with_defaults("top-secret", "revdesk", "revdesk-web");
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("top-secret"));
        assert!(dbg.contains("revdesk-web"));
        assert_eq!(cfg.validity(), Duration::hours(24));
    }
}
