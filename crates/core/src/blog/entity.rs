use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::{CompositeKey, Item, KeyError, RepositoryError, Value};

use super::Collection;

/// A blog entity that can be stored through an
/// [`ItemRepository`](crate::storage::ItemRepository).
pub trait Entity: Sized + Serialize + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Fields an update must never overwrite: identifiers and creation time.
    const IMMUTABLE_FIELDS: &'static [&'static str];

    fn key(&self) -> Result<CompositeKey, KeyError>;

    fn to_item(&self) -> Item;

    fn from_item(item: &Item) -> Result<Self, RepositoryError>;
}

// ============================================================================
// Item field helpers
// ============================================================================

pub(crate) fn put(item: &mut Item, field: &str, value: impl Into<Value>) {
    item.insert(field.to_string(), value.into());
}

pub(crate) fn put_optional(item: &mut Item, field: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        put(item, field, value);
    }
}

fn invalid(field: &str) -> RepositoryError {
    RepositoryError::InvalidData(format!("Missing or invalid field: {field}"))
}

pub(crate) fn get_string(item: &Item, field: &str) -> Result<String, RepositoryError> {
    item.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid(field))
}

/// Missing and `Null` both read as `None`.
pub(crate) fn get_optional_string(item: &Item, field: &str) -> Result<Option<String>, RepositoryError> {
    match item.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(field)),
    }
}

pub(crate) fn get_bool(item: &Item, field: &str) -> Result<bool, RepositoryError> {
    match item.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(value) => value.as_bool().ok_or_else(|| invalid(field)),
    }
}

pub(crate) fn get_u64(item: &Item, field: &str) -> Result<u64, RepositoryError> {
    match item.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => value.as_u64().ok_or_else(|| invalid(field)),
    }
}

/// Accepts a string set or a list of strings.
pub(crate) fn get_string_set(item: &Item, field: &str) -> Result<BTreeSet<String>, RepositoryError> {
    match item.get(field) {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::StringSet(set)) => Ok(set.clone()),
        Some(Value::List(values)) => values
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| invalid(field)))
            .collect(),
        Some(_) => Err(invalid(field)),
    }
}

pub(crate) fn get_string_map(
    item: &Item,
    field: &str,
) -> Result<BTreeMap<String, String>, RepositoryError> {
    match item.get(field) {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Map(map)) => map
            .iter()
            .map(|(k, v)| {
                v.as_str()
                    .map(|s| (k.clone(), s.to_string()))
                    .ok_or_else(|| invalid(field))
            })
            .collect(),
        Some(_) => Err(invalid(field)),
    }
}

pub(crate) fn string_map_value(map: &BTreeMap<String, String>) -> Value {
    Value::Map(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect(),
    )
}

pub(crate) fn get_datetime(item: &Item, field: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, field)?;
    parse_datetime(field, &s)
}

pub(crate) fn get_optional_datetime(
    item: &Item,
    field: &str,
) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    get_optional_string(item, field)?
        .map(|s| parse_datetime(field, &s))
        .transpose()
}

fn parse_datetime(field: &str, s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid datetime {field}: {e}")))
}
