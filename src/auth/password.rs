//! Password hashing and verification for machine credentials.
//!
//! Uses Argon2id. Cost parameters are configurable so that test suites can
//! run with cheap settings while production keeps the expensive defaults.

use argon2::{
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::config::AuthConfig;

/// Maximum password length in bytes.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password is empty.
    #[error("password must not be empty")]
    Empty,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} bytes")]
    TooLong,

    /// Argon2 rejected the cost parameters.
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),
}

/// Input for the stand-in digest used when a login names no known machine.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-machines";

/// Argon2id hasher carrying the configured cost parameters.
///
/// Clones share the lazily computed stand-in digest.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Create a hasher with explicit cost parameters.
    ///
    /// - `memory_kib`: memory cost in KiB
    /// - `iterations`: time cost
    /// - `parallelism`: number of lanes
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self {
            params,
            dummy_hash: Arc::new(OnceLock::new()),
        })
    }

    /// Create a hasher from the `[auth]` configuration section.
    pub fn from_config(config: &AuthConfig) -> Result<Self, PasswordError> {
        Self::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
        )
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password.
    ///
    /// Returns a PHC-formatted string embedding the salt and parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use bde_tracker::auth::{verify_password, PasswordHasher};
    ///
    /// let hasher = PasswordHasher::new(1024, 1, 1).unwrap();
    /// let hash = hasher.hash("pass123").unwrap();
    /// assert!(hash.starts_with("$argon2id$"));
    /// assert!(verify_password("pass123", &hash));
    /// ```
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        validate_password(password)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Hash a password on the blocking thread pool.
    pub async fn hash_blocking(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::HashError(e.to_string()))?
    }

    /// A digest made with the configured parameters that no real password
    /// is expected to match. Computed on first use.
    fn dummy_hash(&self) -> Result<&str, PasswordError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.as_str());
        }
        let hash = self.hash(DUMMY_PASSWORD)?;
        Ok(self.dummy_hash.get_or_init(|| hash).as_str())
    }

    /// Run a full verification against the stand-in digest and discard the
    /// result, so an unknown machine costs as much as a wrong password.
    pub async fn verify_dummy_blocking(&self, password: String) {
        let hasher = self.clone();
        let result = tokio::task::spawn_blocking(move || {
            hasher
                .dummy_hash()
                .map(|hash| verify_password(&password, hash))
        })
        .await;

        if let Ok(Err(e)) = result {
            tracing::error!("Failed to compute stand-in password hash: {}", e);
        }
    }

    #[cfg(test)]
    pub(crate) fn dummy_hash_computed(&self) -> bool {
        self.dummy_hash.get().is_some()
    }
}

/// Verify a password against a stored hash.
///
/// Returns `false` for a wrong password and for a digest that cannot be
/// parsed. The comparison itself is constant time.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    // Parameters are taken from the parsed hash.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Verify a password on the blocking thread pool.
pub async fn verify_password_blocking(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}

/// Validate password requirements: non-empty and at most 128 bytes.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}
