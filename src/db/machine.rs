//! Machine model and credential store.
//!
//! A machine is the only security principal: it logs in with its external
//! `machine_id` and a password, and every work session records which
//! machine captured it.

use chrono::{DateTime, Utc};

use super::DbPool;
use crate::{BdeError, Result};

/// A shop-floor terminal allowed to call the API.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Machine {
    /// Internal ID.
    pub id: i64,
    /// External identifier used to log in (unique).
    pub machine_id: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
    /// Whether the machine may still log in.
    pub is_active: bool,
}

/// Data for creating a new machine.
#[derive(Debug, Clone)]
pub struct NewMachine {
    /// External identifier.
    pub machine_id: String,
    /// Password hash (must already be hashed).
    pub password_hash: String,
}

impl NewMachine {
    /// Create a new machine record from an identifier and a pre-computed hash.
    pub fn new(machine_id: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            machine_id: machine_id.into(),
            password_hash: password_hash.into(),
        }
    }
}

const SELECT_MACHINE: &str =
    "SELECT id, machine_id, password_hash, created_at, last_login, is_active FROM bde_machines";

/// Repository for machine credentials.
pub struct MachineRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> MachineRepository<'a> {
    /// Create a new repository over the given pool.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new machine.
    ///
    /// Fails with [`BdeError::Conflict`] if the identifier is taken by any
    /// machine, active or not.
    pub async fn create(&self, new_machine: &NewMachine) -> Result<Machine> {
        let result = sqlx::query(
            "INSERT INTO bde_machines (machine_id, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(&new_machine.machine_id)
        .bind(&new_machine.password_hash)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| BdeError::from_write(e, "Machine ID"))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| BdeError::NotFound("Machine".to_string()))
    }

    /// Get a machine by internal ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Machine>> {
        let machine = sqlx::query_as::<_, Machine>(&format!("{SELECT_MACHINE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(machine)
    }

    /// Get a machine by its external identifier.
    pub async fn get_by_machine_id(&self, machine_id: &str) -> Result<Option<Machine>> {
        let machine =
            sqlx::query_as::<_, Machine>(&format!("{SELECT_MACHINE} WHERE machine_id = ?"))
                .bind(machine_id)
                .fetch_optional(self.pool)
                .await?;
        Ok(machine)
    }

    /// List active machines in creation order.
    pub async fn list_active(&self) -> Result<Vec<Machine>> {
        let machines = sqlx::query_as::<_, Machine>(&format!(
            "{SELECT_MACHINE} WHERE is_active = 1 ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(machines)
    }

    /// Replace a machine's password hash.
    ///
    /// Returns the updated machine, or None if not found.
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<Option<Machine>> {
        let result = sqlx::query("UPDATE bde_machines SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Record a successful login.
    pub async fn update_last_login(&self, id: i64) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        sqlx::query("UPDATE bde_machines SET last_login = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(now)
    }

    /// Mark a machine inactive.
    ///
    /// Returns false only if no machine has this ID; deactivating an inactive
    /// machine again succeeds.
    pub async fn deactivate(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE bde_machines SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all machines, including inactive ones.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bde_machines")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_machine() {
        let db = setup_db().await;
        let repo = MachineRepository::new(db.pool());

        let machine = repo
            .create(&NewMachine::new("MACHINE-001", "hash"))
            .await
            .unwrap();

        assert!(machine.id > 0);
        assert_eq!(machine.machine_id, "MACHINE-001");
        assert_eq!(machine.password_hash, "hash");
        assert!(machine.is_active);
        assert!(machine.last_login.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_machine_id_rejected_even_when_inactive() {
        let db = setup_db().await;
        let repo = MachineRepository::new(db.pool());

        let machine = repo
            .create(&NewMachine::new("MACHINE-001", "hash"))
            .await
            .unwrap();
        assert!(repo.deactivate(machine.id).await.unwrap());

        let result = repo.create(&NewMachine::new("MACHINE-001", "other")).await;
        assert!(matches!(result, Err(BdeError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_by_machine_id() {
        let db = setup_db().await;
        let repo = MachineRepository::new(db.pool());
        repo.create(&NewMachine::new("MACHINE-001", "hash"))
            .await
            .unwrap();

        let found = repo.get_by_machine_id("MACHINE-001").await.unwrap();
        assert!(found.is_some());

        let missing = repo.get_by_machine_id("MACHINE-999").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_active_excludes_inactive() {
        let db = setup_db().await;
        let repo = MachineRepository::new(db.pool());

        let m1 = repo.create(&NewMachine::new("M-1", "h")).await.unwrap();
        let m2 = repo.create(&NewMachine::new("M-2", "h")).await.unwrap();
        repo.deactivate(m1.id).await.unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, m2.id);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_password() {
        let db = setup_db().await;
        let repo = MachineRepository::new(db.pool());
        let machine = repo.create(&NewMachine::new("M-1", "old")).await.unwrap();

        let updated = repo
            .update_password(machine.id, "new")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.password_hash, "new");

        assert!(repo.update_password(999, "new").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_last_login() {
        let db = setup_db().await;
        let repo = MachineRepository::new(db.pool());
        let machine = repo.create(&NewMachine::new("M-1", "h")).await.unwrap();

        let at = repo.update_last_login(machine.id).await.unwrap();

        let reloaded = repo.get_by_id(machine.id).await.unwrap().unwrap();
        assert_eq!(reloaded.last_login.map(|t| t.timestamp()), Some(at.timestamp()));
    }

    #[tokio::test]
    async fn test_deactivate_idempotent_and_unknown() {
        let db = setup_db().await;
        let repo = MachineRepository::new(db.pool());
        let machine = repo.create(&NewMachine::new("M-1", "h")).await.unwrap();

        assert!(repo.deactivate(machine.id).await.unwrap());
        assert!(repo.deactivate(machine.id).await.unwrap());
        assert!(!repo.deactivate(999).await.unwrap());

        let reloaded = repo.get_by_id(machine.id).await.unwrap().unwrap();
        assert!(!reloaded.is_active);
    }
}
