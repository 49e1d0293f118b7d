//! Source stores.
//!
//! A source store lists tables, describes their key attributes and scans
//! every record of a table into memory.

mod json;
mod memory;

#[cfg(feature = "dynamodb")]
mod dynamodb;

pub use json::JsonExportSource;
pub use memory::MemorySource;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbSource;

use async_trait::async_trait;
use ddbsync_core::{KeySchema, SourceRecord};

use crate::config::SourceConfig;
use crate::error::Result;

/// A schemaless record store that tables are copied from.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Returns the name of the store, for logging.
    fn name(&self) -> &'static str;

    /// Lists every table in the store.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Returns the declared key attributes of a table.
    async fn describe_key_schema(&self, table: &str) -> Result<KeySchema>;

    /// Reads every record of a table.
    ///
    /// `concurrency` is a hint for stores that can scan in parallel
    /// segments; records from all segments are returned in segment order.
    async fn scan_all(&self, table: &str, concurrency: usize) -> Result<Vec<SourceRecord>>;
}

/// Opens the source store described by `config`.
pub async fn open(config: &SourceConfig) -> Result<Box<dyn SourceStore>> {
    match config {
        SourceConfig::JsonExport(dir) => Ok(Box::new(JsonExportSource::new(dir.clone()))),
        #[cfg(feature = "dynamodb")]
        SourceConfig::DynamoDb { region } => {
            Ok(Box::new(DynamoDbSource::connect(region.as_deref()).await?))
        }
        #[cfg(not(feature = "dynamodb"))]
        SourceConfig::DynamoDb { .. } => Err(crate::error::SyncError::Configuration(
            String::from("DynamoDB support requires the `dynamodb` feature"),
        )),
    }
}
