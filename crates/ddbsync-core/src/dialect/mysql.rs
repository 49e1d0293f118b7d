//! MySQL dialect.
//!
//! MySQL cannot index or key an unbounded `TEXT` column without a prefix
//! length, so such columns get a prefix in their key and index clauses.

use crate::classify::TypeCategory;
use crate::escape::escape_mysql;
use crate::schema::InferredColumn;
use crate::value::SourceRecord;

use super::{TableOptions, TargetDialect, quote_with};

/// Prefix length used when a `TEXT` column takes part in a key or index.
const TEXT_KEY_PREFIX: usize = 255;

/// MySQL statement dialect.
#[derive(Debug, Clone, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn key_part(&self, column: &InferredColumn) -> String {
        let name = self.quote_identifier(&column.name);
        if column.category == TypeCategory::Text {
            format!("{name}({TEXT_KEY_PREFIX})")
        } else {
            name
        }
    }
}

impl TargetDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_with(name, '`')
    }

    fn escape_text(&self, text: &str) -> String {
        escape_mysql(text)
    }

    fn create_table(
        &self,
        table: &str,
        columns: &[InferredColumn],
        options: &TableOptions,
    ) -> Vec<String> {
        let mut parts = Vec::with_capacity(columns.len());
        let mut trailing_key = None;

        for column in columns {
            let mut def = format!(
                "{} {}",
                self.quote_identifier(&column.name),
                self.type_name(column)
            );
            if column.is_primary_key {
                if column.category == TypeCategory::Text {
                    trailing_key = Some(format!("PRIMARY KEY ({})", self.key_part(column)));
                } else {
                    def.push_str(" PRIMARY KEY");
                }
            }
            parts.push(def);
            if column.is_indexed && !column.is_primary_key {
                parts.push(format!("INDEX({})", self.key_part(column)));
            }
        }
        parts.extend(trailing_key);

        vec![format!(
            "CREATE TABLE IF NOT EXISTS {} ({}) ENGINE={} DEFAULT CHARSET={}",
            self.quote_identifier(table),
            parts.join(", "),
            options.engine,
            options.charset
        )]
    }

    fn truncate(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {}", self.quote_identifier(table))
    }

    fn upsert(
        &self,
        table: &str,
        record: &SourceRecord,
        primary_key: Option<&str>,
    ) -> Option<String> {
        let insert = self.insert_prefix(table, record)?;
        let key = primary_key.or_else(|| record.iter_reversed().next().map(|(name, _)| name))?;
        let key = self.quote_identifier(key);
        Some(format!("{insert} ON DUPLICATE KEY UPDATE {key} = {key}"))
    }
}
