//! In-memory source, for embedding and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use ddbsync_core::{KeySchema, SourceRecord};

use super::SourceStore;
use crate::error::{Result, SyncError};

/// A source holding its tables in memory, listed in name order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: BTreeMap<String, (KeySchema, Vec<SourceRecord>)>,
}

impl MemorySource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a table.
    #[must_use]
    pub fn table(
        mut self,
        name: impl Into<String>,
        keys: KeySchema,
        records: Vec<SourceRecord>,
    ) -> Self {
        self.tables.insert(name.into(), (keys, records));
        self
    }

    fn get(&self, table: &str) -> Result<&(KeySchema, Vec<SourceRecord>)> {
        self.tables
            .get(table)
            .ok_or_else(|| SyncError::from_source(table, "table not found"))
    }
}

#[async_trait]
impl SourceStore for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn describe_key_schema(&self, table: &str) -> Result<KeySchema> {
        Ok(self.get(table)?.0.clone())
    }

    async fn scan_all(&self, table: &str, _concurrency: usize) -> Result<Vec<SourceRecord>> {
        Ok(self.get(table)?.1.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn source() -> MemorySource {
        MemorySource::new()
            .table(
                "users",
                KeySchema::new("id"),
                vec![SourceRecord::new().field("id", "1")],
            )
            .table("orders", KeySchema::new("order_id"), Vec::new())
    }

    #[test]
    fn test_tables_listed_by_name() {
        let tables = block_on(source().list_tables()).unwrap();
        assert_eq!(tables, vec!["orders", "users"]);
    }

    #[test]
    fn test_scan_and_keys() {
        let source = source();
        assert_eq!(block_on(source.scan_all("users", 8)).unwrap().len(), 1);
        assert_eq!(
            block_on(source.describe_key_schema("orders")).unwrap(),
            KeySchema::new("order_id")
        );
        assert!(matches!(
            block_on(source.scan_all("missing", 1)),
            Err(SyncError::Source { .. })
        ));
    }
}
