//! Table synchronizer.
//!
//! Drives one table at a time through scan, inference, reconciliation,
//! schema migration and data copy. Each table is scanned once; the same
//! records feed inference and the copy.

use chrono::{DateTime, Utc};
use ddbsync_core::{InferredSchema, MigrationPlan, SourceRecord, infer, reconcile};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, SyncOptions};
use crate::error::Result;
use crate::source::SourceStore;
use crate::target::TargetStore;

/// Everything needed to migrate and fill one table.
#[derive(Debug, Clone)]
pub struct TablePlan {
    /// Table name (same in source and target).
    pub table: String,
    /// Schema inferred from the scanned records.
    pub schema: InferredSchema,
    /// Additive migration against the target.
    pub migration: MigrationPlan,
    /// Rendered migration statements, in execution order.
    pub statements: Vec<String>,
    /// Scanned records.
    pub records: Vec<SourceRecord>,
}

/// Result of synchronizing one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    /// Schema migrated and records copied.
    Synced {
        /// Table name.
        table: String,
        /// Whether the target table was created by this run.
        created: bool,
        /// Number of columns created or added.
        columns_changed: usize,
        /// Number of upsert statements executed.
        records_copied: usize,
    },
    /// Dry run: statements that would run.
    Planned {
        /// Table name.
        table: String,
        /// Migration statements.
        statements: Vec<String>,
    },
    /// The source table had no records.
    Skipped {
        /// Table name.
        table: String,
    },
}

impl TableOutcome {
    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Synced { table, .. } | Self::Planned { table, .. } | Self::Skipped { table } => {
                table
            }
        }
    }
}

/// A table that failed during a run that continued past failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableError {
    /// Table name.
    pub table: String,
    /// Error message.
    pub message: String,
}

/// Summary of a multi-table run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Per-table outcomes, in processing order.
    pub outcomes: Vec<TableOutcome>,
    /// Tables that failed.
    pub failures: Vec<TableError>,
}

impl SyncReport {
    fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Returns true if no table failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Copies tables from a source store into a target database.
pub struct Synchronizer {
    source: Box<dyn SourceStore>,
    target: Box<dyn TargetStore>,
    options: SyncOptions,
}

impl Synchronizer {
    /// Creates a synchronizer with default options.
    #[must_use]
    pub fn new(source: Box<dyn SourceStore>, target: Box<dyn TargetStore>) -> Self {
        Self {
            source,
            target,
            options: SyncOptions::default(),
        }
    }

    /// Sets the run options.
    #[must_use]
    pub fn options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the target store.
    #[must_use]
    pub fn target(&self) -> &dyn TargetStore {
        self.target.as_ref()
    }

    /// Scans a table, infers its schema and reconciles it with the target.
    ///
    /// Returns `None` when the source table is empty. Nothing is written.
    pub async fn plan_table(&self, table: &str) -> Result<Option<TablePlan>> {
        info!(table = %table, source = self.source.name(), "Scanning source table");
        let keys = self.source.describe_key_schema(table).await?;
        let records = self
            .source
            .scan_all(table, self.options.concurrency)
            .await?;

        let Some(schema) = infer(&records, &keys) else {
            return Ok(None);
        };
        info!(
            table = %table,
            records = records.len(),
            columns = schema.len(),
            "Inferred schema"
        );

        let existing = self.target.existing_columns(table).await?;
        let migration = reconcile(table, &schema, existing.as_deref());
        let statements = self
            .target
            .dialect()
            .plan_statements(&migration, &self.options.table_options);

        Ok(Some(TablePlan {
            table: table.to_string(),
            schema,
            migration,
            statements,
            records,
        }))
    }

    /// Applies a plan's migration statements.
    pub async fn migrate_schema(&self, plan: &TablePlan) -> Result<()> {
        if plan.migration.is_empty() {
            debug!(table = %plan.table, "Schema already up to date");
            return Ok(());
        }

        info!(
            table = %plan.table,
            create = matches!(plan.migration, MigrationPlan::CreateTable { .. }),
            columns = plan.migration.columns().len(),
            "Migrating schema"
        );
        for sql in &plan.statements {
            self.run(sql).await?;
        }
        Ok(())
    }

    /// Copies records into the table, optionally truncating it first.
    ///
    /// Returns the number of upsert statements executed. A failing record
    /// aborts the copy; records before it stay written.
    pub async fn copy_data(
        &self,
        table: &str,
        schema: &InferredSchema,
        records: &[SourceRecord],
    ) -> Result<usize> {
        let dialect = self.target.dialect();

        if self.options.truncate {
            info!(table = %table, "Truncating target table");
            self.run(&dialect.truncate(table)).await?;
        }

        let primary_key = schema.primary_key().map(|c| c.name.as_str());
        let mut copied = 0;
        for record in records {
            let Some(sql) = dialect.upsert(table, record, primary_key) else {
                debug!(table = %table, "Skipping record without fields");
                continue;
            };
            self.run(&sql).await?;
            copied += 1;
        }

        info!(table = %table, records = copied, "Copied records");
        Ok(copied)
    }

    /// Synchronizes one table.
    pub async fn sync_table(&self, table: &str) -> Result<TableOutcome> {
        let Some(plan) = self.plan_table(table).await? else {
            warn!(table = %table, "Source table is empty, skipping");
            return Ok(TableOutcome::Skipped {
                table: table.to_string(),
            });
        };

        if self.options.dry_run {
            return Ok(TableOutcome::Planned {
                table: plan.table,
                statements: plan.statements,
            });
        }

        self.migrate_schema(&plan).await?;
        let records_copied = self
            .copy_data(&plan.table, &plan.schema, &plan.records)
            .await?;

        Ok(TableOutcome::Synced {
            created: matches!(plan.migration, MigrationPlan::CreateTable { .. }),
            columns_changed: plan.migration.columns().len(),
            records_copied,
            table: plan.table,
        })
    }

    /// Synchronizes every table in the source store, in listing order.
    ///
    /// With [`FailurePolicy::Abort`] the first failure is returned as the
    /// error. With [`FailurePolicy::Continue`] failures are collected in the
    /// report and the remaining tables are still processed.
    pub async fn sync_all(&self) -> Result<SyncReport> {
        let mut report = SyncReport::start();
        let tables = self.source.list_tables().await?;
        info!(tables = tables.len(), "Synchronizing all tables");

        for table in tables {
            match self.sync_table(&table).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) if self.options.failure_policy == FailurePolicy::Continue => {
                    warn!(table = %table, error = %e, "Table failed, continuing");
                    report.failures.push(TableError {
                        table,
                        message: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        report.finished_at = Some(Utc::now());
        Ok(report)
    }

    async fn run(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Executing SQL");
        self.target.execute(sql).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::source::MemorySource;
    use crate::target::SqliteTarget;
    use ddbsync_core::KeySchema;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    async fn create_test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool")
    }

    fn people() -> Vec<SourceRecord> {
        vec![
            SourceRecord::new().field("id", "1").field("name", "Alice"),
            SourceRecord::new()
                .field("id", "2")
                .field("name", "Bob")
                .field("age", 30),
        ]
    }

    fn synchronizer(source: MemorySource, pool: &SqlitePool) -> Synchronizer {
        Synchronizer::new(Box::new(source), Box::new(SqliteTarget::new(pool.clone())))
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM \"{table}\""))
            .fetch_one(pool)
            .await
            .unwrap();
        n
    }

    async fn column_names(pool: &SqlitePool, table: &str) -> Vec<String> {
        let rows: Vec<(String,)> =
            sqlx::query_as(&format!("SELECT name FROM pragma_table_info('{table}')"))
                .fetch_all(pool)
                .await
                .unwrap();
        rows.into_iter().map(|(n,)| n).collect()
    }

    #[tokio::test]
    async fn test_sync_creates_and_copies() {
        let pool = create_test_pool().await;
        let source = MemorySource::new().table("people", KeySchema::new("id"), people());
        let sync = synchronizer(source, &pool);

        let outcome = sync.sync_table("people").await.unwrap();
        assert_eq!(
            outcome,
            TableOutcome::Synced {
                table: String::from("people"),
                created: true,
                columns_changed: 3,
                records_copied: 2,
            }
        );
        assert_eq!(column_names(&pool, "people").await, vec!["name", "id", "age"]);
        assert_eq!(count(&pool, "people").await, 2);

        let (age,): (Option<i64>,) =
            sqlx::query_as("SELECT age FROM people WHERE id = 2")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(age, Some(30));
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let pool = create_test_pool().await;
        let source = MemorySource::new().table("people", KeySchema::new("id"), people());
        let sync = synchronizer(source, &pool);

        sync.sync_table("people").await.unwrap();
        let outcome = sync.sync_table("people").await.unwrap();

        assert!(matches!(
            outcome,
            TableOutcome::Synced { created: false, columns_changed: 0, .. }
        ));
        assert_eq!(count(&pool, "people").await, 2);
    }

    #[tokio::test]
    async fn test_new_field_adds_column() {
        let pool = create_test_pool().await;
        let keys = KeySchema::new("id");
        synchronizer(MemorySource::new().table("people", keys.clone(), people()), &pool)
            .sync_table("people")
            .await
            .unwrap();

        let mut grown = people();
        grown.push(
            SourceRecord::new()
                .field("id", "3")
                .field("name", "Carol")
                .field("email", "carol@example.com"),
        );
        let outcome = synchronizer(MemorySource::new().table("people", keys, grown), &pool)
            .sync_table("people")
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            TableOutcome::Synced { created: false, columns_changed: 1, records_copied: 3, .. }
        ));
        assert_eq!(
            column_names(&pool, "people").await,
            vec!["name", "id", "age", "email"]
        );
        assert_eq!(count(&pool, "people").await, 3);
    }

    #[tokio::test]
    async fn test_duplicate_keys_keep_first_row() {
        let pool = create_test_pool().await;
        let records = vec![
            SourceRecord::new().field("id", "1").field("name", "first"),
            SourceRecord::new().field("id", "1").field("name", "second"),
        ];
        let source = MemorySource::new().table("t", KeySchema::new("id"), records);
        synchronizer(source, &pool).sync_table("t").await.unwrap();

        let (name,): (String,) = sqlx::query_as("SELECT name FROM t")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(name, "first");
    }

    #[tokio::test]
    async fn test_truncate_replaces_rows() {
        let pool = create_test_pool().await;
        let keys = KeySchema::new("id");
        synchronizer(MemorySource::new().table("people", keys.clone(), people()), &pool)
            .sync_table("people")
            .await
            .unwrap();

        let renamed = vec![SourceRecord::new().field("id", "1").field("name", "Alicia")];
        synchronizer(MemorySource::new().table("people", keys, renamed), &pool)
            .options(SyncOptions::new().truncate(true))
            .sync_table("people")
            .await
            .unwrap();

        assert_eq!(count(&pool, "people").await, 1);
        let (name,): (String,) = sqlx::query_as("SELECT name FROM people")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(name, "Alicia");
    }

    #[tokio::test]
    async fn test_empty_table_is_skipped() {
        let pool = create_test_pool().await;
        let source = MemorySource::new().table("empty", KeySchema::new("id"), Vec::new());
        let sync = synchronizer(source, &pool);

        let outcome = sync.sync_table("empty").await.unwrap();
        assert_eq!(
            outcome,
            TableOutcome::Skipped {
                table: String::from("empty")
            }
        );
        assert!(!sync.target().table_exists("empty").await.unwrap());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let pool = create_test_pool().await;
        let source = MemorySource::new().table("people", KeySchema::new("id"), people());
        let sync = synchronizer(source, &pool).options(SyncOptions::new().dry_run(true));

        match sync.sync_table("people").await.unwrap() {
            TableOutcome::Planned { statements, .. } => {
                assert_eq!(
                    statements,
                    vec![
                        "CREATE TABLE IF NOT EXISTS \"people\" (\"name\" VARCHAR(7), \
                         \"id\" BIGINT PRIMARY KEY, \"age\" BIGINT)"
                    ]
                );
            }
            other => panic!("Expected Planned, got {other:?}"),
        }
        assert!(!sync.target().table_exists("people").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_source_table() {
        let pool = create_test_pool().await;
        let sync = synchronizer(MemorySource::new(), &pool);
        assert!(matches!(
            sync.sync_table("ghosts").await,
            Err(SyncError::Source { .. })
        ));
    }

    async fn broken_setup(pool: &SqlitePool) -> MemorySource {
        // Rows without `required` violate NOT NULL, which DO NOTHING does not cover.
        sqlx::query("CREATE TABLE broken (id TEXT PRIMARY KEY, required TEXT NOT NULL)")
            .execute(pool)
            .await
            .unwrap();

        MemorySource::new()
            .table(
                "broken",
                KeySchema::new("id"),
                vec![SourceRecord::new().field("id", "1")],
            )
            .table("people", KeySchema::new("id"), people())
    }

    #[tokio::test]
    async fn test_sync_all_aborts_on_first_failure() {
        let pool = create_test_pool().await;
        let source = broken_setup(&pool).await;
        let sync = synchronizer(source, &pool);

        let result = sync.sync_all().await;
        assert!(matches!(result, Err(SyncError::Statement { .. })));
        assert!(!sync.target().table_exists("people").await.unwrap());
    }

    #[tokio::test]
    async fn test_sync_all_continues_past_failures() {
        let pool = create_test_pool().await;
        let source = broken_setup(&pool).await;
        let sync = synchronizer(source, &pool)
            .options(SyncOptions::new().failure_policy(FailurePolicy::Continue));

        let report = sync.sync_all().await.unwrap();
        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].table, "broken");
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].table(), "people");
        assert!(report.finished_at.is_some());
        assert_eq!(count(&pool, "people").await, 2);
    }
}
