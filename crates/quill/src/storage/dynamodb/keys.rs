//! DynamoDB key attributes.
//!
//! Pure functions mapping a [`CompositeKey`] onto the table's `PK`/`SK`
//! attributes and back.

use aws_sdk_dynamodb::types::AttributeValue;
use quill_core::storage::{CompositeKey, Value};

use super::codec::{decode_field, AttributeMap};

// ============================================================================
// Key attribute names
// ============================================================================

pub const PARTITION_KEY: &str = "PK";
pub const SORT_KEY: &str = "SK";

/// Attributes owned by the key schema; never patched, stripped on read.
pub const KEY_ATTRIBUTES: [&str; 2] = [PARTITION_KEY, SORT_KEY];

/// Key map for `key`. Flat keys carry no `SK`.
pub fn key_attributes(key: &CompositeKey) -> AttributeMap {
    let mut map = AttributeMap::new();
    map.insert(
        PARTITION_KEY.to_string(),
        AttributeValue::S(key.partition.clone()),
    );
    if let Some(sort) = &key.sort {
        map.insert(SORT_KEY.to_string(), AttributeValue::S(sort.clone()));
    }
    map
}

/// Read the key back from an item or a `LastEvaluatedKey`.
pub fn key_from_attributes(map: &AttributeMap) -> Option<CompositeKey> {
    let Ok(Some(Value::String(partition))) = decode_field(map, PARTITION_KEY) else {
        return None;
    };
    let sort = match decode_field(map, SORT_KEY) {
        Ok(Some(Value::String(sort))) => Some(sort),
        _ => None,
    };
    Some(CompositeKey { partition, sort })
}
