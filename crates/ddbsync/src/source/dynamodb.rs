//! DynamoDB source.
//!
//! Uses a parallel segmented scan: one `Scan` request chain per segment,
//! all segments awaited together.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, KeyType};
use ddbsync_core::{KeySchema, ScalarValue, SourceRecord};
use futures::future::try_join_all;
use tracing::debug;

use super::SourceStore;
use crate::error::{Result, SyncError};

type Item = HashMap<String, AttributeValue>;

/// A source reading live DynamoDB tables.
pub struct DynamoDbSource {
    client: Client,
}

impl DynamoDbSource {
    /// Connects with credentials from the environment, optionally
    /// overriding the region.
    pub async fn connect(region: Option<&str>) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let config = loader.load().await;

        Ok(Self::from_client(Client::new(&config)))
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn scan_segment(&self, table: &str, segment: i32, total: i32) -> Result<Vec<SourceRecord>> {
        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let response = self
                .client
                .scan()
                .table_name(table)
                .segment(segment)
                .total_segments(total)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| SyncError::from_source(table, DisplayErrorContext(&e)))?;

            records.extend(response.items.unwrap_or_default().into_iter().map(to_record));

            start_key = response.last_evaluated_key.filter(|k| !k.is_empty());
            if start_key.is_none() {
                break;
            }
        }

        debug!(table = %table, segment, records = records.len(), "Scanned segment");
        Ok(records)
    }
}

#[async_trait]
impl SourceStore for DynamoDbSource {
    fn name(&self) -> &'static str {
        "dynamodb"
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        let mut start: Option<String> = None;

        loop {
            let response = self
                .client
                .list_tables()
                .set_exclusive_start_table_name(start)
                .send()
                .await
                .map_err(|e| SyncError::from_source("*", DisplayErrorContext(&e)))?;

            tables.extend(response.table_names.unwrap_or_default());

            start = response.last_evaluated_table_name;
            if start.is_none() {
                break;
            }
        }

        Ok(tables)
    }

    async fn describe_key_schema(&self, table: &str) -> Result<KeySchema> {
        let response = self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(|e| SyncError::from_source(table, DisplayErrorContext(&e)))?;

        let description = response
            .table
            .ok_or_else(|| SyncError::from_source(table, "DescribeTable returned no table"))?;

        let partition_key = description
            .key_schema()
            .iter()
            .find(|k| *k.key_type() == KeyType::Hash)
            .map(|k| k.attribute_name().to_string())
            .ok_or_else(|| SyncError::from_source(table, "table has no HASH key"))?;

        let mut keys = KeySchema::new(partition_key);
        for definition in description.attribute_definitions() {
            let name = definition.attribute_name();
            if !keys.is_partition_key(name) {
                keys = keys.other_key(name);
            }
        }

        Ok(keys)
    }

    async fn scan_all(&self, table: &str, concurrency: usize) -> Result<Vec<SourceRecord>> {
        let total = i32::try_from(concurrency.max(1)).unwrap_or(i32::MAX);
        let segments = (0..total).map(|segment| self.scan_segment(table, segment, total));
        let parts = try_join_all(segments).await?;

        Ok(parts.into_iter().flatten().collect())
    }
}

/// Converts a scanned item, enumerating attributes in name order.
fn to_record(item: Item) -> SourceRecord {
    let mut attributes: Vec<(String, AttributeValue)> = item.into_iter().collect();
    attributes.sort_by(|a, b| a.0.cmp(&b.0));

    attributes
        .into_iter()
        .map(|(name, value)| (name, to_scalar(value)))
        .collect()
}

fn to_scalar(value: AttributeValue) -> ScalarValue {
    match value {
        AttributeValue::S(text) => ScalarValue::Text(text),
        AttributeValue::N(number) => ScalarValue::from_number_text(&number),
        AttributeValue::Bool(flag) => ScalarValue::Bool(flag),
        AttributeValue::Null(_) => ScalarValue::Missing,
        other => ScalarValue::Nested(to_json(other).to_string()),
    }
}

fn to_json(value: AttributeValue) -> serde_json::Value {
    use serde_json::Value;

    match value {
        AttributeValue::S(text) => Value::String(text),
        AttributeValue::N(number) => serde_json::from_str(&number).unwrap_or(Value::String(number)),
        AttributeValue::Bool(flag) => Value::Bool(flag),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::B(blob) => Value::String(String::from_utf8_lossy(blob.as_ref()).into_owned()),
        AttributeValue::Ss(items) => Value::Array(items.into_iter().map(Value::String).collect()),
        AttributeValue::Ns(items) => Value::Array(
            items
                .into_iter()
                .map(|n| serde_json::from_str(&n).unwrap_or(Value::String(n)))
                .collect(),
        ),
        AttributeValue::Bs(items) => Value::Array(
            items
                .into_iter()
                .map(|b| Value::String(String::from_utf8_lossy(b.as_ref()).into_owned()))
                .collect(),
        ),
        AttributeValue::L(items) => Value::Array(items.into_iter().map(to_json).collect()),
        AttributeValue::M(map) => {
            let mut entries: Vec<(String, AttributeValue)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, to_json(v))).collect())
        }
        _ => Value::Null,
    }
}
