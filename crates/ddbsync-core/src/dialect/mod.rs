//! Target database dialects.
//!
//! Each dialect knows how to render a [`MigrationPlan`], a table truncation
//! and a per-record upsert as native statements for its database.

mod mysql;
mod sqlite;

pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use serde::{Deserialize, Serialize};

use crate::classify::TypeCategory;
use crate::reconcile::MigrationPlan;
use crate::schema::InferredColumn;
use crate::value::{ScalarValue, SourceRecord};

/// Table-level options applied when a table is created.
///
/// Only dialects with a notion of storage engines and character sets
/// (MySQL) use them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Storage engine name.
    pub engine: String,
    /// Default character set name.
    pub charset: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            engine: String::from("InnoDB"),
            charset: String::from("utf8"),
        }
    }
}

/// Trait for database-specific statement generation.
pub trait TargetDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Quotes an identifier (table or column name).
    fn quote_identifier(&self, name: &str) -> String;

    /// Escapes text for use inside a single-quoted literal.
    fn escape_text(&self, text: &str) -> String;

    /// Renders a value as a literal. Values are embedded in their text form
    /// without coercion to the column type.
    fn literal(&self, value: &ScalarValue) -> String {
        match value {
            ScalarValue::Missing => String::from("NULL"),
            other => format!("'{}'", self.escape_text(&other.canonical_text())),
        }
    }

    /// Returns the native type for an inferred column.
    fn type_name(&self, column: &InferredColumn) -> String {
        match column.category {
            TypeCategory::Varchar => format!("VARCHAR({})", column.length),
            TypeCategory::Integer => String::from("BIGINT"),
            TypeCategory::Decimal => format!("DECIMAL({}, 2)", column.length + 2),
            TypeCategory::Boolean => String::from("BOOLEAN"),
            TypeCategory::Text => String::from("TEXT"),
        }
    }

    /// Generates the statements creating a table with its primary key and
    /// secondary indexes.
    fn create_table(
        &self,
        table: &str,
        columns: &[InferredColumn],
        options: &TableOptions,
    ) -> Vec<String>;

    /// Generates an ADD COLUMN statement. Added columns are nullable and
    /// carry no key or index constraint.
    fn add_column(&self, table: &str, column: &InferredColumn) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.quote_identifier(table),
            self.quote_identifier(&column.name),
            self.type_name(column)
        )
    }

    /// Generates the statements for a migration plan, in execution order.
    fn plan_statements(&self, plan: &MigrationPlan, options: &TableOptions) -> Vec<String> {
        match plan {
            MigrationPlan::CreateTable { table, columns } => {
                self.create_table(table, columns, options)
            }
            MigrationPlan::AddColumns { table, columns } => columns
                .iter()
                .map(|c| self.add_column(table, c))
                .collect(),
        }
    }

    /// Generates a statement removing every row of a table.
    fn truncate(&self, table: &str) -> String;

    /// Generates the INSERT prefix shared by upserts: the record's fields,
    /// in reverse enumeration order, with their literal values.
    ///
    /// Returns `None` for a record without fields.
    fn insert_prefix(&self, table: &str, record: &SourceRecord) -> Option<String> {
        if record.is_empty() {
            return None;
        }
        let (columns, values): (Vec<String>, Vec<String>) = record
            .iter_reversed()
            .map(|(name, value)| (self.quote_identifier(name), self.literal(value)))
            .unzip();

        Some(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quote_identifier(table),
            columns.join(", "),
            values.join(", ")
        ))
    }

    /// Generates an insert-or-ignore statement for one record.
    ///
    /// A row whose primary key already exists is left untouched.
    /// `primary_key` is the schema's primary-key column, if any. Returns
    /// `None` for a record without fields.
    fn upsert(
        &self,
        table: &str,
        record: &SourceRecord,
        primary_key: Option<&str>,
    ) -> Option<String>;
}

/// Quotes `name` with `quote`, doubling any embedded quote character.
pub(crate) fn quote_with(name: &str, quote: char) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for c in name.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}
