//! Schema representation types.
//!
//! These types describe the column set inferred from scanned records, the
//! key metadata declared by the source store, and the columns the target
//! table already has.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::classify::TypeCategory;

/// Key attributes declared by the source store for a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    /// Partition (hash) key. Becomes the target primary key.
    pub partition_key: String,
    /// Other declared key attributes. Each becomes a secondary index.
    #[serde(default)]
    pub other_keys: Vec<String>,
}

impl KeySchema {
    /// Creates a key schema with only a partition key.
    #[must_use]
    pub fn new(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            other_keys: Vec::new(),
        }
    }

    /// Adds a secondary key attribute.
    #[must_use]
    pub fn other_key(mut self, name: impl Into<String>) -> Self {
        self.other_keys.push(name.into());
        self
    }

    /// Returns true if `name` is the partition key.
    #[must_use]
    pub fn is_partition_key(&self, name: &str) -> bool {
        self.partition_key == name
    }

    /// Returns true if `name` is one of the other key attributes.
    #[must_use]
    pub fn is_other_key(&self, name: &str) -> bool {
        self.other_keys.iter().any(|k| k == name)
    }
}

/// A column inferred from scanned records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredColumn {
    /// Column name.
    pub name: String,
    /// Type category.
    #[serde(rename = "type")]
    pub category: TypeCategory,
    /// Maximum observed text length. Inflated once inference completes.
    pub length: usize,
    /// Whether this column is the primary key.
    pub is_primary_key: bool,
    /// Whether this column gets a secondary index.
    pub is_indexed: bool,
}

impl InferredColumn {
    /// Creates a column with no key flags.
    #[must_use]
    pub fn new(name: impl Into<String>, category: TypeCategory, length: usize) -> Self {
        Self {
            name: name.into(),
            category,
            length,
            is_primary_key: false,
            is_indexed: false,
        }
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Marks the column as indexed.
    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.is_indexed = true;
        self
    }
}

/// Ordered set of inferred columns, keyed by name.
///
/// Column order is the order of first appearance across the scanned
/// records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InferredSchema {
    columns: Vec<InferredColumn>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl InferredSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, builder style.
    #[must_use]
    pub fn column(mut self, column: InferredColumn) -> Self {
        self.push(column);
        self
    }

    /// Appends a column. Returns false (and leaves the schema unchanged) if
    /// a column with the same name already exists.
    pub fn push(&mut self, column: InferredColumn) -> bool {
        if self.positions.contains_key(&column.name) {
            return false;
        }
        self.positions.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
        true
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&InferredColumn> {
        self.positions.get(name).map(|&i| &self.columns[i])
    }

    /// Gets a mutable column by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut InferredColumn> {
        self.positions.get(name).map(|&i| &mut self.columns[i])
    }

    /// Returns true if a column with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Returns the columns in order.
    #[must_use]
    pub fn columns(&self) -> &[InferredColumn] {
        &self.columns
    }

    /// Mutable access to every column, in order.
    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut InferredColumn> {
        self.columns.iter_mut()
    }

    /// Returns the primary-key column, if one was observed.
    #[must_use]
    pub fn primary_key(&self) -> Option<&InferredColumn> {
        self.columns.iter().find(|c| c.is_primary_key)
    }

    /// Returns column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A column as reported by the target database's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingColumn {
    /// Column name.
    pub name: String,
    /// Native type name, as reported by the catalog.
    #[serde(rename = "type")]
    pub native_type: String,
    /// Whether the column is part of the primary key.
    pub is_primary_key: bool,
}

impl ExistingColumn {
    /// Creates a new existing column description.
    #[must_use]
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            is_primary_key: false,
        }
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }
}
