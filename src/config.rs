//! Configuration module.

use serde::Deserialize;
use std::path::Path;

use crate::{BdeError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins. Empty means any origin without credentials.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/bde.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT signing secret (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
    /// Clock skew tolerated when checking token expiry, in seconds.
    #[serde(default = "default_token_leeway")]
    pub token_leeway_secs: u64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    /// Argon2 time cost (iterations).
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    /// Argon2 parallelism (lanes).
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
    /// Machine created on startup when no machine exists yet.
    #[serde(default)]
    pub bootstrap_machine_id: Option<String>,
    /// Password for the bootstrap machine.
    #[serde(default)]
    pub bootstrap_password: Option<String>,
}

fn default_token_expiry() -> u64 {
    28800 // one 8 hour shift
}

fn default_token_leeway() -> u64 {
    30
}

fn default_hash_memory() -> u32 {
    65536
}

fn default_hash_iterations() -> u32 {
    3
}

fn default_hash_parallelism() -> u32 {
    4
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: default_token_expiry(),
            token_leeway_secs: default_token_leeway(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
            bootstrap_machine_id: None,
            bootstrap_password: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; stdout only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(BdeError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| BdeError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `BDE_JWT_SECRET`: signing secret
    /// - `BDE_BOOTSTRAP_PASSWORD`: password of the bootstrap machine
    /// - `BDE_PORT`: HTTP port
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("BDE_JWT_SECRET") {
            if !secret.is_empty() {
                self.auth.jwt_secret = secret;
            }
        }
        if let Ok(password) = std::env::var("BDE_BOOTSTRAP_PASSWORD") {
            if !password.is_empty() {
                self.auth.bootstrap_password = Some(password);
            }
        }
        if let Ok(port) = std::env::var("BDE_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid BDE_PORT value: {port}"),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the JWT secret is empty, the token lifetime is
    /// zero, or the Argon2 parameters are out of range.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(BdeError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via the BDE_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.auth.token_expiry_secs == 0 {
            return Err(BdeError::Config(
                "token_expiry_secs must be greater than zero".to_string(),
            ));
        }
        if self.auth.hash_parallelism == 0 || self.auth.hash_iterations == 0 {
            return Err(BdeError::Config(
                "hash_iterations and hash_parallelism must be at least 1".to_string(),
            ));
        }
        if self.auth.hash_memory_kib < 8 * self.auth.hash_parallelism {
            return Err(BdeError::Config(
                "hash_memory_kib must be at least 8 KiB per lane".to_string(),
            ));
        }
        if self.auth.bootstrap_machine_id.is_some() && self.auth.bootstrap_password.is_none() {
            return Err(BdeError::Config(
                "bootstrap_machine_id is set but no bootstrap password was given".to_string(),
            ));
        }
        Ok(())
    }
}
