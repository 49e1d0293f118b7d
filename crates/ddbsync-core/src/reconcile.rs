//! Additive schema reconciliation.
//!
//! Compares an [`InferredSchema`] with the columns a target table already
//! has and produces the migration needed to make the table accept every
//! inferred column. Plans only ever create tables or add columns.

use std::collections::HashSet;

use serde::Serialize;

use crate::schema::{ExistingColumn, InferredColumn, InferredSchema};

/// An additive migration for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationPlan {
    /// Create the table with every inferred column.
    CreateTable {
        /// Table name.
        table: String,
        /// Columns in inferred order.
        columns: Vec<InferredColumn>,
    },
    /// Add the listed columns to an existing table.
    AddColumns {
        /// Table name.
        table: String,
        /// Columns to add, in reverse inferred order.
        columns: Vec<InferredColumn>,
    },
}

impl MigrationPlan {
    /// Returns the table this plan applies to.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::CreateTable { table, .. } | Self::AddColumns { table, .. } => table,
        }
    }

    /// Returns the columns this plan creates or adds.
    #[must_use]
    pub fn columns(&self) -> &[InferredColumn] {
        match self {
            Self::CreateTable { columns, .. } | Self::AddColumns { columns, .. } => columns,
        }
    }

    /// Returns true if applying the plan changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::AddColumns { columns, .. } if columns.is_empty())
    }
}

/// Reconciles `inferred` against the target table's current columns.
///
/// `existing` is `None` when the table does not exist yet. Columns present
/// only in `existing`, and type differences on shared columns, are left
/// alone.
#[must_use]
pub fn reconcile(
    table: &str,
    inferred: &InferredSchema,
    existing: Option<&[ExistingColumn]>,
) -> MigrationPlan {
    let Some(existing) = existing else {
        return MigrationPlan::CreateTable {
            table: table.to_string(),
            columns: inferred.columns().to_vec(),
        };
    };

    let existing_names: HashSet<&str> = existing.iter().map(|c| c.name.as_str()).collect();
    let columns = inferred
        .columns()
        .iter()
        .rev()
        .filter(|c| !existing_names.contains(c.name.as_str()))
        .cloned()
        .collect();

    MigrationPlan::AddColumns {
        table: table.to_string(),
        columns,
    }
}
