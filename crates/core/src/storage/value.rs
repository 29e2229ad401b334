//! Semantic attribute values, items and patches.
//!
//! These are the backend-neutral shapes every repository speaks. The
//! wide-column adapter translates them to its tagged wire representation and
//! the relational adapter stores them as JSON documents.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A typed attribute value.
///
/// The serde representation is externally tagged with the same tags the
/// wide-column store uses on the wire, so a persisted document never loses the
/// distinction between an ordered list and a string set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Decimal text as written; no float rounding on the way through.
    #[serde(rename = "N")]
    Number(Number),
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "L")]
    List(Vec<Value>),
    /// The wide-column wire has no empty string set: an empty set is stored
    /// as `NULL` and reads back as [`Value::Null`]. Readers that expect a set
    /// treat a missing or `Null` field as empty.
    #[serde(rename = "SS")]
    StringSet(BTreeSet<String>),
    #[serde(rename = "M")]
    Map(BTreeMap<String, Value>),
}

/// A stored entity: field name to value.
pub type Item = BTreeMap<String, Value>;

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Plain JSON view of the value. String sets become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::StringSet(set) => serde_json::Value::Array(
                set.iter()
                    .map(|s| serde_json::Value::String(s.clone()))
                    .collect(),
            ),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

/// Non-finite floats have no decimal form and become `Null`.
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value.into_iter().map(Value::String).collect())
    }
}

impl From<BTreeSet<String>> for Value {
    fn from(value: BTreeSet<String>) -> Self {
        Value::StringSet(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// A partial entity.
///
/// Each field maps to `Some(value)` (write this value, `Null` and `""`
/// included) or `None` (explicitly undefined: leave the stored field alone).
/// Fields that are not present at all are also left alone. Iteration order is
/// the lexical order of the field names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    fields: BTreeMap<String, Option<Value>>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a concrete value.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), Some(value.into()));
        self
    }

    /// Set a field when `value` is `Some`, otherwise mark it undefined.
    pub fn set_optional<V: Into<Value>>(mut self, field: impl Into<String>, value: Option<V>) -> Self {
        self.fields.insert(field.into(), value.map(Into::into));
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Option<Value>) {
        self.fields.insert(field.into(), value);
    }

    /// `None` when the field is absent, `Some(None)` when it is undefined.
    pub fn get(&self, field: &str) -> Option<Option<&Value>> {
        self.fields.get(field).map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Fields that would actually be written: not excluded and not undefined.
    pub fn effective_fields<'a>(
        &'a self,
        exclude: &'a [&'a str],
    ) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.fields.iter().filter_map(move |(field, value)| {
            if exclude.contains(&field.as_str()) {
                return None;
            }
            value.as_ref().map(|v| (field.as_str(), v))
        })
    }

    pub fn has_effective_fields(&self, exclude: &[&str]) -> bool {
        self.effective_fields(exclude).next().is_some()
    }

    /// Merge the effective fields into `item`.
    pub fn apply_to(&self, item: &mut Item, exclude: &[&str]) {
        for (field, value) in self.effective_fields(exclude) {
            item.insert(field.to_string(), value.clone());
        }
    }
}

impl FromIterator<(String, Value)> for Patch {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Patch {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
    }
}
