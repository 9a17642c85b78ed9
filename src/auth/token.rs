//! Stateless bearer tokens.
//!
//! Tokens are HS256 JWTs whose subject is the machine's external
//! identifier. There is no server-side session store; expiry is the only
//! way a token stops being valid.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::{BdeError, Result};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (machine external identifier).
    pub sub: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
}

/// Issues and verifies signed access tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_secs: u64,
}

impl TokenService {
    /// Create a token service from a secret, a token lifetime and the clock
    /// skew tolerated on expiry checks.
    pub fn new(secret: &str, expiry_secs: u64, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_secs,
        }
    }

    /// Create a token service from the `[auth]` configuration section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            config.token_expiry_secs,
            config.token_leeway_secs,
        )
    }

    /// Issue a token for `subject`, valid from now.
    pub fn issue(&self, subject: &str) -> Result<String> {
        self.issue_at(subject, chrono::Utc::now().timestamp() as u64)
    }

    /// Issue a token for `subject` as if it had been minted at `issued_at`
    /// (seconds since the epoch).
    pub fn issue_at(&self, subject: &str, issued_at: u64) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.expiry_secs),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            BdeError::Config(format!("token signing failed: {e}"))
        })
    }

    /// Verify a token and return its subject.
    ///
    /// Bad signatures, malformed tokens, foreign algorithms and expired
    /// tokens all yield `None`.
    pub fn verify(&self, token: &str) -> Option<String> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                tracing::debug!("JWT validation failed: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expiry_secs", &self.expiry_secs)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}
