//! Error types for the BDE work tracker.

use thiserror::Error;

use crate::auth::PasswordError;

/// Common error type for the BDE work tracker.
#[derive(Error, Debug)]
pub enum BdeError {
    /// Database error.
    ///
    /// Wraps errors from the storage backend that the repositories do not
    /// translate into a more specific kind.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No credential was presented.
    #[error("authentication required")]
    AuthenticationRequired,

    /// A credential was presented but could not be accepted.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The caller is known but not allowed (e.g. a disabled machine).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A natural key (machine id, part number, ...) is already taken.
    #[error("{0} already exists")]
    Conflict(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unexpected failure that is not the caller's fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for BdeError {
    fn from(e: sqlx::Error) -> Self {
        BdeError::Database(e.to_string())
    }
}

impl From<PasswordError> for BdeError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Empty | PasswordError::TooLong => BdeError::Validation(e.to_string()),
            PasswordError::InvalidParams(msg) => BdeError::Config(msg),
            PasswordError::HashError(msg) => BdeError::Internal(msg),
        }
    }
}

impl BdeError {
    /// Translate a failed INSERT/UPDATE into a domain error.
    ///
    /// Unique-constraint violations become [`BdeError::Conflict`] naming
    /// `what`, foreign-key violations become [`BdeError::Validation`].
    /// Everything else stays a database error.
    pub fn from_write(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return BdeError::Conflict(what.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return BdeError::Validation(format!("{what} references a missing record"));
            }
        }
        BdeError::Database(e.to_string())
    }
}

/// Result type alias for BDE work tracker operations.
pub type Result<T> = std::result::Result<T, BdeError>;
