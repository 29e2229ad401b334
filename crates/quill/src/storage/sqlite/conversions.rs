//! Conversions between repository types and SQLite columns.

use chrono::{DateTime, SecondsFormat, Utc};

use quill_core::storage::{CompositeKey, Item, RepositoryError, Result};

/// Item as stored in the `body` column.
pub fn encode_body(item: &Item) -> Result<String> {
    serde_json::to_string(item)
        .map_err(|e| RepositoryError::InvalidData(format!("Cannot encode item: {e}")))
}

pub fn decode_body(body: &str) -> Result<Item> {
    serde_json::from_str(body)
        .map_err(|e| RepositoryError::InvalidData(format!("Cannot decode item: {e}")))
}

/// The `sk` column value: flat keys store an empty string.
pub fn sort_column(key: &CompositeKey) -> String {
    key.sort.clone().unwrap_or_default()
}

pub fn key_from_columns(pk: String, sk: String) -> CompositeKey {
    CompositeKey {
        partition: pk,
        sort: (!sk.is_empty()).then_some(sk),
    }
}

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
