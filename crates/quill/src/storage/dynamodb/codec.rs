//! DynamoDB attribute codec.
//!
//! Pure functions converting between semantic [`Value`]s and the store's
//! tagged `AttributeValue` wire format. Testable in isolation without DynamoDB
//! access.

use std::collections::{BTreeSet, HashMap};

use aws_sdk_dynamodb::types::AttributeValue;
use quill_core::storage::{Item, RepositoryError, Value};
use serde_json::Number;
use thiserror::Error;

pub type AttributeMap = HashMap<String, AttributeValue>;

/// Errors decoding wire values that have no semantic counterpart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unsupported attribute type {0}")]
    Unsupported(&'static str),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

impl From<CodecError> for RepositoryError {
    fn from(err: CodecError) -> Self {
        RepositoryError::InvalidData(err.to_string())
    }
}

/// Encode a semantic value.
///
/// An empty string set has no wire form and is written as `NULL`.
pub fn encode(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::List(items) => AttributeValue::L(items.iter().map(encode).collect()),
        Value::StringSet(set) if set.is_empty() => AttributeValue::Null(true),
        Value::StringSet(set) => AttributeValue::Ss(set.iter().cloned().collect()),
        Value::Map(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), encode(v)))
                .collect(),
        ),
    }
}

/// Decode a wire value. `NS` becomes a list of numbers.
pub fn decode(value: &AttributeValue) -> Result<Value, CodecError> {
    match value {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::N(n) => parse_number(n).map(Value::Number),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::L(items) => items
            .iter()
            .map(decode)
            .collect::<Result<_, _>>()
            .map(Value::List),
        AttributeValue::Ss(items) => Ok(Value::StringSet(
            items.iter().cloned().collect::<BTreeSet<_>>(),
        )),
        AttributeValue::Ns(items) => items
            .iter()
            .map(|n| parse_number(n).map(Value::Number))
            .collect::<Result<_, _>>()
            .map(Value::List),
        AttributeValue::M(map) => map
            .iter()
            .map(|(k, v)| decode(v).map(|v| (k.clone(), v)))
            .collect::<Result<_, _>>()
            .map(Value::Map),
        AttributeValue::B(_) => Err(CodecError::Unsupported("B")),
        AttributeValue::Bs(_) => Err(CodecError::Unsupported("BS")),
        _ => Err(CodecError::Unsupported("unknown")),
    }
}

fn parse_number(n: &str) -> Result<Number, CodecError> {
    n.parse::<Number>()
        .map_err(|_| CodecError::InvalidNumber(n.to_string()))
}

pub fn encode_item(item: &Item) -> AttributeMap {
    item.iter().map(|(k, v)| (k.clone(), encode(v))).collect()
}

/// Decode every attribute except the ones named in `skip`.
pub fn decode_item(map: &AttributeMap, skip: &[&str]) -> Result<Item, CodecError> {
    map.iter()
        .filter(|(k, _)| !skip.contains(&k.as_str()))
        .map(|(k, v)| decode(v).map(|v| (k.clone(), v)))
        .collect()
}

/// Decode a single field. A missing field is `None`.
pub fn decode_field(map: &AttributeMap, name: &str) -> Result<Option<Value>, CodecError> {
    map.get(name).map(decode).transpose()
}
