//! Process configuration, read once at startup and shared immutably.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, bail};

use revdesk_auth::AuthConfig;
use revdesk_infra::SeedAccount;

const DEV_JWT_SECRET: &str = "dev-secret";
const DEV_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    bind_addr: SocketAddr,
    auth: Arc<AuthConfig>,
    seed_accounts: Vec<SeedAccount>,
}

impl ApiConfig {
    pub const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:8089";
    pub const DEFAULT_ISSUER: &'static str = "revdesk";
    pub const DEFAULT_AUDIENCE: &'static str = "revdesk-web";

    pub fn new(bind_addr: SocketAddr, auth: AuthConfig, seed_accounts: Vec<SeedAccount>) -> Self {
        Self {
            bind_addr,
            auth: Arc::new(auth),
            seed_accounts,
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| Self::DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address")?;

        let secret = lookup("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });
        if secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let issuer = lookup("JWT_ISSUER").unwrap_or_else(|| Self::DEFAULT_ISSUER.to_string());
        let audience = lookup("JWT_AUDIENCE").unwrap_or_else(|| Self::DEFAULT_AUDIENCE.to_string());

        let hours = match lookup("JWT_EXPIRATION_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .context("JWT_EXPIRATION_HOURS must be an integer")?,
            None => AuthConfig::DEFAULT_VALIDITY_HOURS,
        };
        if hours < 1 {
            bail!("JWT_EXPIRATION_HOURS must be at least 1, got {hours}");
        }

        let admin_password = lookup("ADMIN_PASSWORD").unwrap_or_else(|| {
            tracing::warn!("ADMIN_PASSWORD not set; seeding admin with insecure dev default");
            DEV_ADMIN_PASSWORD.to_string()
        });

        Ok(Self::new(
            bind_addr,
            AuthConfig::new(secret, issuer, audience, chrono::Duration::hours(hours)),
            vec![SeedAccount::admin(admin_password)],
        ))
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn auth(&self) -> Arc<AuthConfig> {
        self.auth.clone()
    }

    pub fn seed_accounts(&self) -> &[SeedAccount] {
        &self.seed_accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr().port(), 8089);
        assert_eq!(cfg.auth().issuer(), ApiConfig::DEFAULT_ISSUER);
        assert_eq!(cfg.auth().validity(), chrono::Duration::hours(24));
        assert_eq!(cfg.seed_accounts()[0].username, "admin");
    }

    #[test]
    fn explicit_values_win() {
        let cfg = ApiConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s"),
            ("JWT_ISSUER", "iss"),
            ("JWT_AUDIENCE", "aud"),
            ("JWT_EXPIRATION_HOURS", "2"),
            ("ADMIN_PASSWORD", "pw"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.auth().secret(), b"s");
        assert_eq!(cfg.auth().audience(), "aud");
        assert_eq!(cfg.auth().validity(), chrono::Duration::hours(2));
        assert_eq!(cfg.seed_accounts()[0].password, "pw");
    }

    #[test]
    fn invalid_numbers_fail_startup() {
        assert!(ApiConfig::from_lookup(lookup(&[("JWT_EXPIRATION_HOURS", "soon")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[("JWT_EXPIRATION_HOURS", "0")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])).is_err());
    }
}
