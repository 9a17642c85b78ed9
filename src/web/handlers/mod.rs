//! API handlers.

pub mod auth;
pub mod catalog;
pub mod machine;
pub mod user;
pub mod work_session;

pub use auth::*;
pub use catalog::*;
pub use machine::*;
pub use user::*;
pub use work_session::*;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::AuthConfig;
use crate::{Database, Result};

/// Shared application state, built once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Token issuer and verifier.
    pub tokens: TokenService,
    /// Password hasher for provisioning and resets.
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self { db, tokens, hasher }
    }

    /// Create the application state from the `[auth]` configuration section.
    pub fn from_config(db: Database, config: &AuthConfig) -> Result<Self> {
        let hasher = PasswordHasher::from_config(config)?;
        Ok(Self::new(db, TokenService::from_config(config), hasher))
    }
}
