//! Copy DynamoDB tables into MySQL or SQLite.
//!
//! `ddbsync` scans every record of a source table, infers a relational
//! schema from them, brings the target table up to that schema with
//! additive DDL only, and then upserts the records.
//!
//! # Architecture
//!
//! - **Sources** - [`SourceStore`] implementations: a JSON export directory,
//!   an in-memory store, and DynamoDB behind the `dynamodb` feature
//! - **Targets** - [`TargetStore`] implementations for MySQL and SQLite
//! - **Synchronizer** - Runs scan, inference, migration and copy per table
//! - **Config** - Validated run settings, resolved from CLI flags and env
//!
//! Inference, reconciliation and statement rendering live in
//! [`ddbsync_core`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ddbsync::prelude::*;
//!
//! let source = JsonExportSource::new("export");
//! let target = SqliteTarget::connect("sqlite:out.db").await?;
//! let sync = Synchronizer::new(Box::new(source), Box::new(target))
//!     .options(SyncOptions::new().truncate(true));
//!
//! let report = sync.sync_all().await?;
//! assert!(report.is_success());
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Copy one table from a JSON export into SQLite
//! ddbsync --source-dir export --sqlite-url sqlite:out.db table users
//!
//! # Copy every DynamoDB table into MySQL, continuing past failures
//! MYSQL_HOST=db MYSQL_USER=sync MYSQL_DATABASE=warehouse ddbsync all --continue-on-error
//!
//! # Show the DDL a run would issue
//! ddbsync --source-dir export --sqlite-url sqlite:out.db plan users
//! ```

pub mod config;
pub mod error;
pub mod source;
pub mod sync;
pub mod target;

pub use config::{FailurePolicy, MySqlSettings, SourceConfig, SyncOptions, TargetConfig};
pub use error::{Result, SyncError};
pub use source::{JsonExportSource, MemorySource, SourceStore};
pub use sync::{SyncReport, Synchronizer, TableOutcome, TablePlan};
pub use target::{MySqlTarget, SqliteTarget, TargetStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{FailurePolicy, SourceConfig, SyncOptions, TargetConfig};
    pub use crate::error::{Result, SyncError};
    pub use crate::source::{JsonExportSource, MemorySource, SourceStore};
    pub use crate::sync::{SyncReport, Synchronizer, TableOutcome};
    pub use crate::target::{MySqlTarget, SqliteTarget, TargetStore};
    pub use ddbsync_core::prelude::*;
}
