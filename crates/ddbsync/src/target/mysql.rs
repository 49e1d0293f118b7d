//! MySQL target.

use async_trait::async_trait;
use ddbsync_core::{ExistingColumn, MySqlDialect, TableOptions, TargetDialect};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use super::TargetStore;
use crate::config::MySqlConfig;
use crate::error::{Result, SyncError};

const MAX_CONNECTIONS: u32 = 5;

/// A MySQL database.
pub struct MySqlTarget {
    pool: MySqlPool,
    dialect: MySqlDialect,
}

impl MySqlTarget {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
            dialect: MySqlDialect::new(),
        }
    }

    /// Connects using validated settings. The connection uses the same
    /// charset that created tables default to.
    pub async fn connect(config: &MySqlConfig, options: &TableOptions) -> Result<Self> {
        let mut connect = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database)
            .charset(&options.charset);
        if let Some(password) = &config.password {
            connect = connect.password(password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(connect)
            .await?;

        Ok(Self::new(pool))
    }

    /// Returns the connection pool.
    #[must_use]
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl TargetStore for MySqlTarget {
    fn dialect(&self) -> &dyn TargetDialect {
        &self.dialect
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn current_columns(&self, table: &str) -> Result<Vec<ExistingColumn>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR), CAST(COLUMN_KEY AS CHAR) \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, native_type, key)| {
                let mut column = ExistingColumn::new(name, native_type);
                column.is_primary_key = key == "PRI";
                column
            })
            .collect())
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
