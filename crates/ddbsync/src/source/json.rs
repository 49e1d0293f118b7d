//! JSON export source.
//!
//! Reads a directory where each table is stored as `<table>.json`:
//!
//! ```json
//! {
//!   "key_schema": { "partition_key": "id", "other_keys": ["email"] },
//!   "items": [ { "id": "1", "email": "a@example.com" } ]
//! }
//! ```
//!
//! Item field order is preserved as written in the file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ddbsync_core::{KeySchema, SourceRecord};
use serde::Deserialize;
use tracing::debug;

use super::SourceStore;
use crate::error::{Result, SyncError};

const EXTENSION: &str = "json";

#[derive(Debug, Deserialize)]
struct ExportFile {
    key_schema: KeySchema,
    #[serde(default)]
    items: Vec<SourceRecord>,
}

/// A source backed by a directory of JSON export files.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    dir: PathBuf,
}

impl JsonExportSource {
    /// Creates a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the export directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, table: &str) -> Result<PathBuf> {
        if table.is_empty() || table.contains(['/', '\\']) || table.starts_with('.') {
            return Err(SyncError::from_source(table, "invalid table name"));
        }
        Ok(self.dir.join(format!("{table}.{EXTENSION}")))
    }

    async fn load(&self, table: &str) -> Result<ExportFile> {
        let path = self.table_path(table)?;
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SyncError::from_source(table, format!("{}: {e}", path.display())))?;
        debug!(table = %table, path = %path.display(), "Parsing export file");
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl SourceStore for JsonExportSource {
    fn name(&self) -> &'static str {
        "json-export"
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut tables = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                tables.push(stem.to_string());
            }
        }
        tables.sort();

        Ok(tables)
    }

    async fn describe_key_schema(&self, table: &str) -> Result<KeySchema> {
        Ok(self.load(table).await?.key_schema)
    }

    async fn scan_all(&self, table: &str, _concurrency: usize) -> Result<Vec<SourceRecord>> {
        let items = self.load(table).await?.items;
        debug!(table = %table, records = items.len(), "Read export file");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddbsync_core::ScalarValue;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn export_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "users.json",
            r#"{
                "key_schema": {"partition_key": "id", "other_keys": ["email"]},
                "items": [
                    {"zeta": 1, "id": "1", "alpha": null, "email": "a@example.com"},
                    {"id": "2", "tags": ["x", "y"], "active": true}
                ]
            }"#,
        );
        write(
            dir.path(),
            "orders.json",
            r#"{"key_schema": {"partition_key": "order_id"}}"#,
        );
        write(dir.path(), "notes.txt", "not a table");
        dir
    }

    #[tokio::test]
    async fn test_list_tables_sorted() {
        let dir = export_dir();
        let source = JsonExportSource::new(dir.path());
        assert_eq!(source.list_tables().await.unwrap(), vec!["orders", "users"]);
    }

    #[tokio::test]
    async fn test_key_schema() {
        let dir = export_dir();
        let source = JsonExportSource::new(dir.path());

        let keys = source.describe_key_schema("users").await.unwrap();
        assert_eq!(keys, KeySchema::new("id").other_key("email"));

        let keys = source.describe_key_schema("orders").await.unwrap();
        assert!(keys.other_keys.is_empty());
    }

    #[tokio::test]
    async fn test_scan_preserves_field_order() {
        let dir = export_dir();
        let source = JsonExportSource::new(dir.path());

        let records = source.scan_all("users", 4).await.unwrap();
        assert_eq!(records.len(), 2);

        let names: Vec<&str> = records[0].iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "id", "alpha", "email"]);
        assert_eq!(records[0].get("alpha"), Some(&ScalarValue::Missing));
        assert_eq!(records[0].get("zeta"), Some(&ScalarValue::Int(1)));
        assert_eq!(
            records[1].get("tags"),
            Some(&ScalarValue::Nested(String::from(r#"["x","y"]"#)))
        );
    }

    #[tokio::test]
    async fn test_table_without_items_is_empty() {
        let dir = export_dir();
        let source = JsonExportSource::new(dir.path());
        assert!(source.scan_all("orders", 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_table_is_source_error() {
        let dir = export_dir();
        let source = JsonExportSource::new(dir.path());

        let err = source.scan_all("ghosts", 1).await.unwrap_err();
        assert!(matches!(err, SyncError::Source { ref table, .. } if table == "ghosts"));
    }

    #[tokio::test]
    async fn test_malformed_file_is_serialization_error() {
        let dir = export_dir();
        write(dir.path(), "broken.json", "{ not json");
        let source = JsonExportSource::new(dir.path());

        let err = source.describe_key_schema("broken").await.unwrap_err();
        assert!(matches!(err, SyncError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error: "));
    }

    #[tokio::test]
    async fn test_rejects_path_like_names() {
        let dir = export_dir();
        let source = JsonExportSource::new(dir.path());
        assert!(source.scan_all("../users", 1).await.is_err());
    }
}
