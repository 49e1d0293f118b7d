//! # ddbsync-core
//!
//! Schema inference and additive reconciliation for moving schemaless
//! records into a fixed-schema relational table.
//!
//! This crate provides:
//! - A tagged value model for scanned records ([`ScalarValue`], [`SourceRecord`])
//! - A type classifier and promotion lattice ([`classify`], [`promote`])
//! - A schema inference fold ([`infer`]) producing an [`InferredSchema`]
//! - An additive-only reconciliation step ([`reconcile`]) producing a [`MigrationPlan`]
//! - Dialect-aware rendering of plans, truncation and upserts ([`TargetDialect`])
//!
//! The crate performs no I/O. Scanning the source store and talking to the
//! target database live in the `ddbsync` crate.
//!
//! ## Example
//!
//! ```rust
//! use ddbsync_core::prelude::*;
//!
//! let records = vec![
//!     SourceRecord::new()
//!         .field("id", ScalarValue::Text("1".into()))
//!         .field("name", ScalarValue::Text("Alice".into())),
//!     SourceRecord::new()
//!         .field("id", ScalarValue::Text("2".into()))
//!         .field("name", ScalarValue::Text("Bob".into()))
//!         .field("age", ScalarValue::Int(30)),
//! ];
//! let keys = KeySchema::new("id");
//!
//! let schema = infer(&records, &keys).expect("non-empty input");
//! assert_eq!(schema.len(), 3);
//!
//! let plan = reconcile("people", &schema, None);
//! let statements = MySqlDialect::new().plan_statements(&plan, &TableOptions::default());
//! assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS `people`"));
//! ```

pub mod classify;
pub mod dialect;
pub mod escape;
pub mod infer;
pub mod reconcile;
pub mod schema;
pub mod value;

pub use classify::{TypeCategory, classify, promote};
pub use dialect::{MySqlDialect, SqliteDialect, TableOptions, TargetDialect};
pub use infer::infer;
pub use reconcile::{MigrationPlan, reconcile};
pub use schema::{ExistingColumn, InferredColumn, InferredSchema, KeySchema};
pub use value::{ScalarValue, SourceRecord};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::classify::{TypeCategory, classify, promote};
    pub use crate::dialect::{MySqlDialect, SqliteDialect, TableOptions, TargetDialect};
    pub use crate::infer::infer;
    pub use crate::reconcile::{MigrationPlan, reconcile};
    pub use crate::schema::{ExistingColumn, InferredColumn, InferredSchema, KeySchema};
    pub use crate::value::{ScalarValue, SourceRecord};
}
