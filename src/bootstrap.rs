//! First-start provisioning.
//!
//! Every API call except login needs a machine token, so an empty database
//! would be unusable. When configured, a bootstrap machine is created on
//! startup while the machines table is still empty.

use tracing::{info, warn};

use crate::auth::{register_machine, PasswordHasher};
use crate::config::AuthConfig;
use crate::db::{Machine, MachineRepository};
use crate::{Database, Result};

/// Create the configured bootstrap machine if no machine exists yet.
///
/// Returns the created machine, or `None` when nothing was done.
pub async fn ensure_bootstrap_machine(
    db: &Database,
    hasher: &PasswordHasher,
    config: &AuthConfig,
) -> Result<Option<Machine>> {
    let count = MachineRepository::new(db.pool()).count().await?;
    if count > 0 {
        return Ok(None);
    }

    let (Some(machine_id), Some(password)) = (
        config.bootstrap_machine_id.as_deref(),
        config.bootstrap_password.as_deref(),
    ) else {
        warn!("No machines registered and no bootstrap machine configured; nobody can log in");
        return Ok(None);
    };

    let machine = register_machine(db, hasher, machine_id, password).await?;
    info!(machine_id, "Created bootstrap machine");
    Ok(Some(machine))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(1024, 1, 1).unwrap()
    }

    fn bootstrap_config() -> AuthConfig {
        AuthConfig {
            bootstrap_machine_id: Some("MACHINE-001".to_string()),
            bootstrap_password: Some("pass123".to_string()),
            ..AuthConfig::default()
        }
    }

    #[tokio::test]
    async fn test_creates_machine_on_empty_database() {
        let db = Database::open_in_memory().await.unwrap();

        let machine = ensure_bootstrap_machine(&db, &hasher(), &bootstrap_config())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(machine.machine_id, "MACHINE-001");
        assert!(verify_password("pass123", &machine.password_hash));
    }

    #[tokio::test]
    async fn test_runs_only_once() {
        let db = Database::open_in_memory().await.unwrap();
        let config = bootstrap_config();

        assert!(ensure_bootstrap_machine(&db, &hasher(), &config)
            .await
            .unwrap()
            .is_some());
        assert!(ensure_bootstrap_machine(&db, &hasher(), &config)
            .await
            .unwrap()
            .is_none());
        assert_eq!(MachineRepository::new(db.pool()).count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_noop_without_configuration() {
        let db = Database::open_in_memory().await.unwrap();

        let result = ensure_bootstrap_machine(&db, &hasher(), &AuthConfig::default())
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(MachineRepository::new(db.pool()).count().await.unwrap(), 0);
    }
}
