//! Authentication module.
//!
//! Machines are the only principals. This module hashes their passwords,
//! issues and verifies bearer tokens, and resolves the machine behind a
//! request.

mod gate;
mod machine;
mod password;
mod token;

pub use gate::{authenticate, bearer_token};
pub use machine::{
    login_machine, register_machine, reset_machine_password, LoginOutcome, INVALID_CREDENTIALS,
};
pub use password::{
    validate_password, verify_password, verify_password_blocking, PasswordError, PasswordHasher,
    MAX_PASSWORD_LENGTH,
};
pub use token::{Claims, TokenService};
