//! Machine credential flows: login, provisioning and password reset.

use tracing::{info, warn};

use super::password::{validate_password, verify_password_blocking, PasswordHasher};
use super::token::TokenService;
use crate::db::{Machine, MachineRepository, NewMachine};
use crate::{BdeError, Database, Result};

/// Message returned for every unknown-machine or wrong-password login.
pub const INVALID_CREDENTIALS: &str = "Invalid machine ID or password";

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed bearer token.
    pub access_token: String,
    /// The machine as stored after the login, `last_login` included.
    pub machine: Machine,
}

/// Authenticate a machine by its external identifier and password.
///
/// An unknown machine and a wrong password are indistinguishable to the
/// caller, in response and in cost: both run one Argon2 verification.
/// A correct password for a disabled machine yields
/// [`BdeError::Forbidden`].
pub async fn login_machine(
    db: &Database,
    tokens: &TokenService,
    hasher: &PasswordHasher,
    machine_id: &str,
    password: &str,
) -> Result<LoginOutcome> {
    let repo = MachineRepository::new(db.pool());

    let Some(machine) = repo.get_by_machine_id(machine_id).await? else {
        hasher.verify_dummy_blocking(password.to_string()).await;
        warn!(machine_id, "Login failed: unknown machine");
        return Err(BdeError::AuthenticationFailed(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password_blocking(password.to_string(), machine.password_hash.clone()).await {
        warn!(machine_id, "Login failed: wrong password");
        return Err(BdeError::AuthenticationFailed(INVALID_CREDENTIALS.to_string()));
    }

    if !machine.is_active {
        warn!(machine_id, "Login refused: machine is inactive");
        return Err(BdeError::Forbidden("Machine is inactive".to_string()));
    }

    let last_login = repo.update_last_login(machine.id).await?;
    let access_token = tokens.issue(&machine.machine_id)?;

    info!(machine_id, "Machine logged in");

    Ok(LoginOutcome {
        access_token,
        machine: Machine {
            last_login: Some(last_login),
            ..machine
        },
    })
}

/// Provision a new machine with the given password.
pub async fn register_machine(
    db: &Database,
    hasher: &PasswordHasher,
    machine_id: &str,
    password: &str,
) -> Result<Machine> {
    validate_password(password)?;
    let password_hash = hasher.hash_blocking(password.to_string()).await?;

    let machine = MachineRepository::new(db.pool())
        .create(&NewMachine::new(machine_id, password_hash))
        .await?;

    info!(machine_id, id = machine.id, "Machine registered");
    Ok(machine)
}

/// Replace the password of the machine with internal ID `id`.
///
/// Tokens issued before the reset stay valid until they expire.
pub async fn reset_machine_password(
    db: &Database,
    hasher: &PasswordHasher,
    id: i64,
    new_password: &str,
) -> Result<Machine> {
    validate_password(new_password)?;
    let password_hash = hasher.hash_blocking(new_password.to_string()).await?;

    let machine = MachineRepository::new(db.pool())
        .update_password(id, &password_hash)
        .await?
        .ok_or_else(|| BdeError::NotFound("Machine".to_string()))?;

    info!(machine_id = %machine.machine_id, "Machine password reset");
    Ok(machine)
}
