//! Schema inference.
//!
//! Folds an ordered collection of records into a single [`InferredSchema`].
//! The fold is sequential: the order in which new columns are discovered
//! depends on record order, while the final type and length of each column
//! do not.

use crate::classify::{TypeCategory, classify, promote};
use crate::schema::{InferredColumn, InferredSchema, KeySchema};
use crate::value::{ScalarValue, SourceRecord};

/// Inferred text columns shorter than this become `varchar`.
pub const VARCHAR_CUTOFF: usize = 250;

/// Infers a schema from `records`.
///
/// Returns `None` when `records` is empty; an empty source table is a skip,
/// not an error.
#[must_use]
pub fn infer(records: &[SourceRecord], keys: &KeySchema) -> Option<InferredSchema> {
    let (first, rest) = records.split_first()?;

    let mut schema = InferredSchema::new();
    discover(&mut schema, first, keys);
    for record in rest {
        discover(&mut schema, record, keys);
        observe(&mut schema, record);
    }
    finalize(&mut schema);

    Some(schema)
}

/// Appends the fields of `record` not yet in `schema`, seeded from this
/// record's values.
fn discover(schema: &mut InferredSchema, record: &SourceRecord, keys: &KeySchema) {
    for (name, value) in record.iter_reversed() {
        if schema.contains(name) {
            continue;
        }
        schema.push(seed_column(name, value, keys));
    }
}

fn seed_column(name: &str, value: &ScalarValue, keys: &KeySchema) -> InferredColumn {
    InferredColumn {
        name: name.to_string(),
        category: classify(value),
        length: value.text_len(),
        is_primary_key: keys.is_partition_key(name),
        is_indexed: keys.is_other_key(name),
    }
}

/// Widens every known column with the values present in `record`.
fn observe(schema: &mut InferredSchema, record: &SourceRecord) {
    for column in schema.columns_mut() {
        let Some(value) = record.get(&column.name) else {
            continue;
        };
        if value.is_missing() {
            continue;
        }
        column.length = column.length.max(value.text_len());
        column.category = promote(column.category, classify(value));
    }
}

/// Inflates lengths by half and bounds short text columns.
fn finalize(schema: &mut InferredSchema) {
    for column in schema.columns_mut() {
        column.length += column.length / 2;
        if column.category == TypeCategory::Text && column.length < VARCHAR_CUTOFF {
            column.category = TypeCategory::Varchar;
        }
    }
}
