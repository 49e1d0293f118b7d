//! SQLite target.

use std::str::FromStr;

use async_trait::async_trait;
use ddbsync_core::{ExistingColumn, SqliteDialect, TargetDialect};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::TargetStore;
use crate::error::{Result, SyncError};

/// A SQLite database.
pub struct SqliteTarget {
    pool: SqlitePool,
    dialect: SqliteDialect,
}

impl SqliteTarget {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            dialect: SqliteDialect::new(),
        }
    }

    /// Opens (creating if needed) the database at `url`.
    ///
    /// In-memory databases are private to a connection, so they get a
    /// single-connection pool.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Returns the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TargetStore for SqliteTarget {
    fn dialect(&self) -> &dyn TargetDialect {
        &self.dialect
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name=?")
                .bind(table)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn current_columns(&self, table: &str) -> Result<Vec<ExistingColumn>> {
        let sql = format!("PRAGMA table_info({})", self.dialect.quote_identifier(table));
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<ExistingColumn> {
                let name: String = row.try_get("name")?;
                let native_type: String = row.try_get("type")?;
                let pk: i64 = row.try_get("pk")?;
                let mut column = ExistingColumn::new(name, native_type);
                column.is_primary_key = pk > 0;
                Ok(column)
            })
            .collect()
    }

    async fn execute(&self, statement: &str) -> Result<u64> {
        let result = sqlx::query(statement)
            .execute(&self.pool)
            .await
            .map_err(|source| SyncError::Statement {
                statement: statement.to_string(),
                source,
            })?;
        Ok(result.rows_affected())
    }
}
