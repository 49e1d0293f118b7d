//! Target stores.
//!
//! A target store exposes its dialect, reads its live catalog and executes
//! generated statements one at a time.

mod mysql;
mod sqlite;

pub use mysql::MySqlTarget;
pub use sqlite::SqliteTarget;

use async_trait::async_trait;
use ddbsync_core::{ExistingColumn, TableOptions, TargetDialect};

use crate::config::TargetConfig;
use crate::error::Result;

/// A relational database that tables are copied into.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Returns the statement dialect for this database.
    fn dialect(&self) -> &dyn TargetDialect;

    /// Returns true if the table exists.
    async fn table_exists(&self, table: &str) -> Result<bool>;

    /// Returns the table's columns in catalog order.
    async fn current_columns(&self, table: &str) -> Result<Vec<ExistingColumn>>;

    /// Executes one statement, returning the number of affected rows.
    async fn execute(&self, statement: &str) -> Result<u64>;

    /// Returns the table's columns, or `None` if the table does not exist.
    async fn existing_columns(&self, table: &str) -> Result<Option<Vec<ExistingColumn>>> {
        if self.table_exists(table).await? {
            Ok(Some(self.current_columns(table).await?))
        } else {
            Ok(None)
        }
    }
}

/// Connects to the target described by `config`.
pub async fn connect(
    config: &TargetConfig,
    options: &TableOptions,
) -> Result<Box<dyn TargetStore>> {
    match config {
        TargetConfig::MySql(mysql) => Ok(Box::new(MySqlTarget::connect(mysql, options).await?)),
        TargetConfig::Sqlite(url) => Ok(Box::new(SqliteTarget::connect(url).await?)),
    }
}
