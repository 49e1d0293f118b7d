//! SQLite dialect.
//!
//! SQLite has no inline index clause in CREATE TABLE, so secondary indexes
//! are emitted as separate `CREATE INDEX` statements. Declared types such as
//! `VARCHAR(12)` are accepted and mapped onto SQLite's type affinities.

use crate::escape::escape_sqlite;
use crate::schema::InferredColumn;
use crate::value::SourceRecord;

use super::{TableOptions, TargetDialect, quote_with};

/// SQLite statement dialect.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn create_index_sql(&self, table: &str, column: &str) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            self.quote_identifier(&format!("idx_{table}_{column}")),
            self.quote_identifier(table),
            self.quote_identifier(column)
        )
    }
}

impl TargetDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '"')
    }

    fn escape_text(&self, text: &str) -> String {
        escape_sqlite(text)
    }

    fn create_table(
        &self,
        table: &str,
        columns: &[InferredColumn],
        _options: &TableOptions,
    ) -> Vec<String> {
        let defs: Vec<String> = columns
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", self.quote_identifier(&c.name), self.type_name(c));
                if c.is_primary_key {
                    def.push_str(" PRIMARY KEY");
                }
                def
            })
            .collect();

        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.quote_identifier(table),
            defs.join(", ")
        )];
        statements.extend(
            columns
                .iter()
                .filter(|c| c.is_indexed && !c.is_primary_key)
                .map(|c| self.create_index_sql(table, &c.name)),
        );
        statements
    }

    fn truncate(&self, table: &str) -> String {
        format!("DELETE FROM {}", self.quote_identifier(table))
    }

    fn upsert(
        &self,
        table: &str,
        record: &SourceRecord,
        _primary_key: Option<&str>,
    ) -> Option<String> {
        let insert = self.insert_prefix(table, record)?;
        Some(format!("{insert} ON CONFLICT DO NOTHING"))
    }
}
