//! Reference code catalogs.
//!
//! Part numbers, order numbers and performance IDs share one shape: a
//! unique code, an optional description and a soft-delete flag. A single
//! repository serves all three, parameterized by [`CodeKind`].

use chrono::{DateTime, Utc};
use sqlx::QueryBuilder;

use super::DbPool;
use crate::{BdeError, Result};

/// Which reference catalog a [`CodeRepository`] operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    /// Manufactured part identifiers.
    PartNumber,
    /// Production order identifiers.
    OrderNumber,
    /// Work-step identifiers.
    PerformanceId,
}

impl CodeKind {
    /// Backing table.
    pub fn table(self) -> &'static str {
        match self {
            CodeKind::PartNumber => "part_numbers",
            CodeKind::OrderNumber => "order_numbers",
            CodeKind::PerformanceId => "performance_ids",
        }
    }

    /// Column holding the code. Also the field name on the wire.
    pub fn key_column(self) -> &'static str {
        match self {
            CodeKind::PartNumber => "part_number",
            CodeKind::OrderNumber => "order_number",
            CodeKind::PerformanceId => "performance_id",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            CodeKind::PartNumber => "Part number",
            CodeKind::OrderNumber => "Order number",
            CodeKind::PerformanceId => "Performance ID",
        }
    }
}

/// One row of a reference catalog.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CodeEntry {
    /// Internal ID.
    pub id: i64,
    /// The code itself (e.g. "PN-12345").
    pub code: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Whether the code is offered for selection.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a catalog entry.
#[derive(Debug, Clone)]
pub struct NewCode {
    /// The code.
    pub code: String,
    /// Free-text description.
    pub description: Option<String>,
}

impl NewCode {
    /// Create a new entry without description.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Sparse update for a catalog entry.
#[derive(Debug, Clone, Default)]
pub struct CodeUpdate {
    /// New code.
    pub code: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
}

impl CodeUpdate {
    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.description.is_none()
    }
}

/// Repository over one reference catalog.
pub struct CodeRepository<'a> {
    pool: &'a DbPool,
    kind: CodeKind,
}

impl<'a> CodeRepository<'a> {
    /// Create a repository for the given catalog.
    pub fn new(pool: &'a DbPool, kind: CodeKind) -> Self {
        Self { pool, kind }
    }

    fn select(&self) -> String {
        format!(
            "SELECT id, {} AS code, description, is_active, created_at FROM {}",
            self.kind.key_column(),
            self.kind.table()
        )
    }

    /// Create a new entry.
    ///
    /// Codes are unique across active and inactive rows, so a deactivated
    /// code cannot be created again.
    pub async fn create(&self, new_code: &NewCode) -> Result<CodeEntry> {
        let sql = format!(
            "INSERT INTO {} ({}, description, created_at) VALUES (?, ?, ?)",
            self.kind.table(),
            self.kind.key_column()
        );
        let result = sqlx::query(&sql)
            .bind(&new_code.code)
            .bind(&new_code.description)
            .bind(Utc::now())
            .execute(self.pool)
            .await
            .map_err(|e| BdeError::from_write(e, self.kind.label()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| BdeError::NotFound(self.kind.label().to_string()))
    }

    /// Get an entry by internal ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<CodeEntry>> {
        let entry = sqlx::query_as::<_, CodeEntry>(&format!("{} WHERE id = ?", self.select()))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(entry)
    }

    /// Get an entry by its code.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<CodeEntry>> {
        let sql = format!("{} WHERE {} = ?", self.select(), self.kind.key_column());
        let entry = sqlx::query_as::<_, CodeEntry>(&sql)
            .bind(code)
            .fetch_optional(self.pool)
            .await?;
        Ok(entry)
    }

    /// List active entries in creation order.
    pub async fn list_active(&self) -> Result<Vec<CodeEntry>> {
        let sql = format!("{} WHERE is_active = 1 ORDER BY id", self.select());
        let entries = sqlx::query_as::<_, CodeEntry>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(entries)
    }

    /// Update an entry.
    ///
    /// Returns the updated entry, or None if not found. Renaming to a code
    /// that is already taken fails with [`BdeError::Conflict`].
    pub async fn update(&self, id: i64, update: &CodeUpdate) -> Result<Option<CodeEntry>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("UPDATE {} SET ", self.kind.table()));
        let mut separated = query.separated(", ");

        if let Some(ref code) = update.code {
            separated.push(format!("{} = ", self.kind.key_column()));
            separated.push_bind_unseparated(code);
        }
        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| BdeError::from_write(e, self.kind.label()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Mark an entry inactive.
    ///
    /// Returns false only if no entry has this ID.
    pub async fn deactivate(&self, id: i64) -> Result<bool> {
        let sql = format!("UPDATE {} SET is_active = 0 WHERE id = ?", self.kind.table());
        let result = sqlx::query(&sql).bind(id).execute(self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
