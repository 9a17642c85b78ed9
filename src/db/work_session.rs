//! Work session records.
//!
//! Sessions are append-only. Reference codes are stored as plain strings so
//! that history survives later changes to the catalogs.

use chrono::{DateTime, Utc};

use super::DbPool;
use crate::{BdeError, Result};

/// A completed unit of work reported by a machine.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkSession {
    /// Internal ID.
    pub id: i64,
    /// Operator who did the work.
    pub user_id: i64,
    /// Internal ID of the machine that recorded the session.
    pub machine_id: i64,
    pub part_number: String,
    pub order_number: String,
    pub performance_id: String,
    /// Worked time in seconds.
    pub duration_seconds: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// When the record was stored.
    pub created_at: DateTime<Utc>,
}

/// Data for recording a session. The machine is supplied separately.
#[derive(Debug, Clone)]
pub struct NewWorkSession {
    pub user_id: i64,
    pub part_number: String,
    pub order_number: String,
    pub performance_id: String,
    pub duration_seconds: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

const SELECT_SESSION: &str = "SELECT id, user_id, machine_id, part_number, order_number, \
     performance_id, duration_seconds, start_time, end_time, created_at FROM work_sessions";

/// Repository for work sessions.
pub struct WorkSessionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> WorkSessionRepository<'a> {
    /// Create a new repository over the given pool.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Record a session for the machine with internal ID `machine_pk`.
    ///
    /// An unknown `user_id` fails with [`BdeError::Validation`].
    pub async fn create(&self, machine_pk: i64, session: &NewWorkSession) -> Result<WorkSession> {
        let result = sqlx::query(
            "INSERT INTO work_sessions (user_id, machine_id, part_number, order_number, \
             performance_id, duration_seconds, start_time, end_time, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(session.user_id)
        .bind(machine_pk)
        .bind(&session.part_number)
        .bind(&session.order_number)
        .bind(&session.performance_id)
        .bind(session.duration_seconds)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| BdeError::from_write(e, "Work session"))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| BdeError::NotFound("Work session".to_string()))
    }

    /// Get a session by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<WorkSession>> {
        let session = sqlx::query_as::<_, WorkSession>(&format!("{SELECT_SESSION} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(session)
    }

    /// List every session in recording order.
    pub async fn list_all(&self) -> Result<Vec<WorkSession>> {
        let sessions = sqlx::query_as::<_, WorkSession>(&format!("{SELECT_SESSION} ORDER BY id"))
            .fetch_all(self.pool)
            .await?;
        Ok(sessions)
    }

    /// List sessions of one operator.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<WorkSession>> {
        let sessions = sqlx::query_as::<_, WorkSession>(&format!(
            "{SELECT_SESSION} WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(sessions)
    }

    /// List sessions recorded by one machine (internal ID).
    pub async fn list_by_machine(&self, machine_pk: i64) -> Result<Vec<WorkSession>> {
        let sessions = sqlx::query_as::<_, WorkSession>(&format!(
            "{SELECT_SESSION} WHERE machine_id = ? ORDER BY id"
        ))
        .bind(machine_pk)
        .fetch_all(self.pool)
        .await?;
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MachineRepository, NewMachine, NewUser, UserRepository};
    use crate::Database;
    use chrono::{Duration, TimeZone};

    struct Fixture {
        db: Database,
        machine_pk: i64,
        user_id: i64,
    }

    async fn setup() -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let machine = MachineRepository::new(db.pool())
            .create(&NewMachine::new("MACHINE-001", "hash"))
            .await
            .unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("John Smith", "Assembly Operator"))
            .await
            .unwrap();
        Fixture {
            db,
            machine_pk: machine.id,
            user_id: user.id,
        }
    }

    fn session_for(user_id: i64) -> NewWorkSession {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        NewWorkSession {
            user_id,
            part_number: "PN-12345".to_string(),
            order_number: "ORD-2024-001".to_string(),
            performance_id: "PERF-001".to_string(),
            duration_seconds: 5400,
            start_time: start,
            end_time: start + Duration::seconds(5400),
        }
    }

    #[tokio::test]
    async fn test_create_session() {
        let f = setup().await;
        let repo = WorkSessionRepository::new(f.db.pool());

        let new = session_for(f.user_id);
        let session = repo.create(f.machine_pk, &new).await.unwrap();

        assert_eq!(session.user_id, f.user_id);
        assert_eq!(session.machine_id, f.machine_pk);
        assert_eq!(session.part_number, "PN-12345");
        assert_eq!(session.duration_seconds, 5400);
        assert_eq!(session.start_time, new.start_time);
        assert_eq!(session.end_time, new.end_time);
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let f = setup().await;
        let repo = WorkSessionRepository::new(f.db.pool());

        let result = repo.create(f.machine_pk, &session_for(999)).await;
        assert!(matches!(result, Err(BdeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_session_survives_user_deactivation() {
        let f = setup().await;
        let repo = WorkSessionRepository::new(f.db.pool());
        let session = repo.create(f.machine_pk, &session_for(f.user_id)).await.unwrap();

        UserRepository::new(f.db.pool())
            .deactivate(f.user_id)
            .await
            .unwrap();

        assert!(repo.get_by_id(session.id).await.unwrap().is_some());
        assert_eq!(repo.list_by_user(f.user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let f = setup().await;
        let other_machine = MachineRepository::new(f.db.pool())
            .create(&NewMachine::new("MACHINE-002", "hash"))
            .await
            .unwrap();
        let other_user = UserRepository::new(f.db.pool())
            .create(&NewUser::new("Sarah", "Inspector"))
            .await
            .unwrap();
        let repo = WorkSessionRepository::new(f.db.pool());

        repo.create(f.machine_pk, &session_for(f.user_id)).await.unwrap();
        repo.create(other_machine.id, &session_for(f.user_id)).await.unwrap();
        repo.create(f.machine_pk, &session_for(other_user.id)).await.unwrap();

        assert_eq!(repo.list_all().await.unwrap().len(), 3);
        assert_eq!(repo.list_by_user(f.user_id).await.unwrap().len(), 2);
        assert_eq!(repo.list_by_user(other_user.id).await.unwrap().len(), 1);
        assert_eq!(repo.list_by_machine(f.machine_pk).await.unwrap().len(), 2);
        assert_eq!(repo.list_by_machine(other_machine.id).await.unwrap().len(), 1);
        assert!(repo.list_by_machine(999).await.unwrap().is_empty());
    }
}
