//! Operator model and repository.
//!
//! Users are the people working at a machine. They do not log in; a
//! machine records work sessions on their behalf.

use chrono::{DateTime, Utc};
use sqlx::QueryBuilder;

use super::DbPool;
use crate::{BdeError, Result};

/// An operator whose work is tracked.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Role label (e.g. "Assembly Operator").
    pub role: String,
    /// Avatar image reference (optional).
    pub image_url: Option<String>,
    /// Whether the user shows up in listings.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Role label.
    pub role: String,
    /// Avatar image reference (optional).
    pub image_url: Option<String>,
}

impl NewUser {
    /// Create a new user with the required fields.
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            image_url: None,
        }
    }

    /// Set the image reference.
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Sparse update for an existing user.
///
/// `None` leaves a field untouched. For `image_url`, `Some(None)` clears the
/// column.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New role label.
    pub role: Option<String>,
    /// New image reference.
    pub image_url: Option<Option<String>>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set new role.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set or clear the image reference.
    pub fn image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = Some(image_url);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.image_url.is_none()
    }
}

const SELECT_USER: &str = "SELECT id, name, role, image_url, is_active, created_at FROM users";

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (name, role, image_url, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&new_user.name)
        .bind(&new_user.role)
        .bind(&new_user.image_url)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| BdeError::from_write(e, "User"))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| BdeError::NotFound("User".to_string()))
    }

    /// Get a user by ID, whether active or not.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Update a user by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated user, or None if not found.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(ref role) = update.role {
            separated.push("role = ");
            separated.push_bind_unseparated(role);
        }
        if let Some(ref image_url) = update.image_url {
            separated.push("image_url = ");
            separated.push_bind_unseparated(image_url.clone());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Mark a user inactive.
    ///
    /// Returns false only if no user has this ID. Work sessions of the user
    /// are kept.
    pub async fn deactivate(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all active users in creation order.
    pub async fn list_active(&self) -> Result<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE is_active = 1 ORDER BY id"))
                .fetch_all(self.pool)
                .await?;
        Ok(users)
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
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("John Smith", "Assembly Operator").with_image_url("a.png"))
            .await
            .unwrap();

        assert_eq!(user.name, "John Smith");
        assert_eq!(user.role, "Assembly Operator");
        assert_eq!(user.image_url.as_deref(), Some("a.png"));
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn test_update_is_sparse() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let user = repo
            .create(&NewUser::new("John Smith", "Assembly Operator").with_image_url("a.png"))
            .await
            .unwrap();

        let updated = repo
            .update(user.id, &UserUpdate::new().role("Line Supervisor"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "John Smith");
        assert_eq!(updated.role, "Line Supervisor");
        assert_eq!(updated.image_url.as_deref(), Some("a.png"));
    }

    #[tokio::test]
    async fn test_update_clears_image_url() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let user = repo
            .create(&NewUser::new("Sarah", "Inspector").with_image_url("b.png"))
            .await
            .unwrap();

        let updated = repo
            .update(user.id, &UserUpdate::new().image_url(None))
            .await
            .unwrap()
            .unwrap();

        assert!(updated.image_url.is_none());
        assert_eq!(updated.name, "Sarah");
    }

    #[tokio::test]
    async fn test_update_empty_and_unknown() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let user = repo.create(&NewUser::new("Mike", "Operator")).await.unwrap();

        let same = repo.update(user.id, &UserUpdate::new()).await.unwrap().unwrap();
        assert_eq!(same.name, "Mike");

        let missing = repo
            .update(999, &UserUpdate::new().name("Nobody"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_deactivate_twice_succeeds() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let user = repo.create(&NewUser::new("Emily", "Supervisor")).await.unwrap();

        assert!(repo.deactivate(user.id).await.unwrap());
        assert!(repo.deactivate(user.id).await.unwrap());
        assert!(!repo.deactivate(999).await.unwrap());

        let reloaded = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert!(!reloaded.is_active);
    }

    #[tokio::test]
    async fn test_list_active_in_creation_order() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let a = repo.create(&NewUser::new("Zed", "Operator")).await.unwrap();
        let b = repo.create(&NewUser::new("Amy", "Operator")).await.unwrap();
        let c = repo.create(&NewUser::new("Bob", "Operator")).await.unwrap();
        repo.deactivate(b.id).await.unwrap();

        let ids: Vec<i64> = repo.list_active().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn test_user_update_builder() {
        let update = UserUpdate::new().name("New Name").image_url(None);

        assert!(update.name.is_some());
        assert_eq!(update.image_url, Some(None));
        assert!(update.role.is_none());
        assert!(!update.is_empty());
        assert!(UserUpdate::new().is_empty());
    }
}
