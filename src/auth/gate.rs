//! Bearer-token gate in front of every protected operation.

use super::token::TokenService;
use crate::db::{Machine, MachineRepository};
use crate::{BdeError, Database, Result};

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. A missing header, another
/// scheme or an empty token all count as no credential.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str> {
    let value = authorization.ok_or(BdeError::AuthenticationRequired)?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(BdeError::AuthenticationRequired)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BdeError::AuthenticationRequired);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(BdeError::AuthenticationRequired);
    }
    Ok(token)
}

/// Resolve the machine behind an `Authorization` header value.
///
/// Every reason a presented token is refused (bad signature, expiry,
/// unknown or inactive machine) produces the same error.
pub async fn authenticate(
    db: &Database,
    tokens: &TokenService,
    authorization: Option<&str>,
) -> Result<Machine> {
    let token = bearer_token(authorization)?;
    let invalid = || BdeError::AuthenticationFailed("Could not validate credentials".to_string());

    let machine_id = tokens.verify(token).ok_or_else(invalid)?;

    let machine = MachineRepository::new(db.pool())
        .get_by_machine_id(&machine_id)
        .await?
        .ok_or_else(invalid)?;

    if !machine.is_active {
        tracing::debug!(machine_id = %machine.machine_id, "Token presented by inactive machine");
        return Err(invalid());
    }

    Ok(machine)
}
