//! Signed session tokens (HS256 JWT).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::claims::{SessionClaims, TokenError, validate_claims};
use crate::config::AuthConfig;
use crate::identity::Identity;

/// Issues and verifies session tokens.
///
/// Stateless: issued tokens are not recorded anywhere, so there is no
/// revocation short of rotating the secret.
#[derive(Clone)]
pub struct TokenService {
    config: Arc<AuthConfig>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        let encoding = EncodingKey::from_secret(config.secret());
        let decoding = DecodingKey::from_secret(config.secret());

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[config.audience()]);

        Self {
            config,
            encoding,
            decoding,
            validation,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Build the claims that [`TokenService::issue`] would sign.
    pub fn claims_for(&self, identity: &Identity, now: DateTime<Utc>) -> SessionClaims {
        let iat = now.timestamp();
        SessionClaims {
            sub: identity.id.to_string(),
            user_id: identity.id,
            role: identity.role,
            iss: self.config.issuer().to_string(),
            aud: self.config.audience().to_string(),
            jti: Uuid::now_v7(),
            iat,
            exp: iat + self.config.validity().num_seconds(),
        }
    }

    /// Mint a token for `identity`, valid from `now` for the configured window.
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = self.claims_for(identity, now);
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature, issuer, audience and expiry; return the embedded claims.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
