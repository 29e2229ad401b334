//! Rendering of update, condition, key and filter expressions.
//!
//! Every attribute name and value goes through a placeholder so reserved
//! words and punctuation in field names never reach the expression text.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use quill_core::storage::{KeyCondition, ScanFilter, SortCondition, UpdateDescriptor};

use super::codec::{self, AttributeMap};
use super::keys::{PARTITION_KEY, SORT_KEY};

/// A precondition on the targeted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The item exists (its partition key attribute is present).
    ItemExists,
    /// No item is stored under the key.
    ItemAbsent,
}

/// Expression text plus its placeholder substitutions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub text: String,
    pub names: HashMap<String, String>,
    pub values: AttributeMap,
}

impl Expression {
    /// Substitution maps in the shape the SDK builders expect, `None` when empty.
    pub fn names(&self) -> Option<HashMap<String, String>> {
        (!self.names.is_empty()).then(|| self.names.clone())
    }

    pub fn values(&self) -> Option<AttributeMap> {
        (!self.values.is_empty()).then(|| self.values.clone())
    }

    /// Take over the substitutions of `other`, keeping this expression's text.
    pub fn absorb(&mut self, other: Expression) {
        self.names.extend(other.names);
        self.values.extend(other.values);
    }
}

pub fn render_update(descriptor: &UpdateDescriptor) -> Expression {
    Expression {
        text: descriptor.clause().to_string(),
        names: descriptor
            .names()
            .map(|(placeholder, field)| (placeholder.to_string(), field.to_string()))
            .collect(),
        values: descriptor
            .values()
            .map(|(placeholder, value)| (placeholder.to_string(), codec::encode(value)))
            .collect(),
    }
}

pub fn render_condition(condition: Condition) -> Expression {
    let text = match condition {
        Condition::ItemExists => "attribute_exists(#pk)",
        Condition::ItemAbsent => "attribute_not_exists(#pk)",
    };
    Expression {
        text: text.to_string(),
        names: HashMap::from([("#pk".to_string(), PARTITION_KEY.to_string())]),
        values: AttributeMap::new(),
    }
}

pub fn render_key_condition(condition: &KeyCondition) -> Expression {
    let mut expression = Expression {
        text: "#pk = :pk".to_string(),
        names: HashMap::from([("#pk".to_string(), PARTITION_KEY.to_string())]),
        values: AttributeMap::from([(
            ":pk".to_string(),
            AttributeValue::S(condition.partition.clone()),
        )]),
    };

    if let Some(sort) = &condition.sort {
        let (text, value) = match sort {
            SortCondition::Equals(value) => (" AND #sk = :sk", value),
            SortCondition::BeginsWith(prefix) => (" AND begins_with(#sk, :sk)", prefix),
        };
        expression.text.push_str(text);
        expression
            .names
            .insert("#sk".to_string(), SORT_KEY.to_string());
        expression
            .values
            .insert(":sk".to_string(), AttributeValue::S(value.clone()));
    }

    expression
}

/// `None` when the filter matches everything.
pub fn render_filter(filter: &ScanFilter) -> Option<Expression> {
    match filter {
        ScanFilter::All => None,
        ScanFilter::PartitionPrefix(prefix) => Some(Expression {
            text: "begins_with(#pk, :pk_prefix)".to_string(),
            names: HashMap::from([("#pk".to_string(), PARTITION_KEY.to_string())]),
            values: AttributeMap::from([(
                ":pk_prefix".to_string(),
                AttributeValue::S(prefix.clone()),
            )]),
        }),
        ScanFilter::AttributeEquals { name, value } => Some(Expression {
            text: "#attr = :attr".to_string(),
            names: HashMap::from([("#attr".to_string(), name.clone())]),
            values: AttributeMap::from([(":attr".to_string(), codec::encode(value))]),
        }),
    }
}

#[cfg(test)]
mod tests {
    use quill_core::storage::{Patch, Value};

    use super::*;

    #[test]
    fn test_render_update() {
        let patch = Patch::new().set("name", "New").set("views", 0i64);
        let descriptor = UpdateDescriptor::build(&patch, &[]).unwrap();

        let expression = render_update(&descriptor);

        assert_eq!(expression.text, "SET #field0 = :value0, #field1 = :value1");
        assert_eq!(expression.names["#field0"], "name");
        assert_eq!(expression.names["#field1"], "views");
        assert_eq!(
            expression.values[":value0"],
            AttributeValue::S("New".to_string())
        );
        assert_eq!(
            expression.values[":value1"],
            AttributeValue::N("0".to_string())
        );
    }

    #[test]
    fn test_update_with_condition_keeps_all_substitutions() {
        let patch = Patch::new().set("name", "New");
        let descriptor = UpdateDescriptor::build(&patch, &[]).unwrap();

        let mut update = render_update(&descriptor);
        let condition = render_condition(Condition::ItemExists);
        let condition_text = condition.text.clone();
        update.absorb(condition);

        assert_eq!(condition_text, "attribute_exists(#pk)");
        assert_eq!(update.names.len(), 2);
        assert_eq!(update.names["#pk"], "PK");
        assert_eq!(update.values.len(), 1);
    }

    #[test]
    fn test_render_key_condition() {
        let plain = render_key_condition(&KeyCondition::partition("cat-1#sub-1"));
        assert_eq!(plain.text, "#pk = :pk");
        assert_eq!(plain.values.len(), 1);

        let with_sort = render_key_condition(
            &KeyCondition::partition("author-1#post-1")
                .with_sort(SortCondition::BeginsWith("post".to_string())),
        );
        assert_eq!(with_sort.text, "#pk = :pk AND begins_with(#sk, :sk)");
        assert_eq!(with_sort.names["#sk"], "SK");
    }

    #[test]
    fn test_render_filter() {
        assert_eq!(render_filter(&ScanFilter::All), None);

        let prefix = render_filter(&ScanFilter::children_of("cat-1").unwrap()).unwrap();
        assert_eq!(prefix.text, "begins_with(#pk, :pk_prefix)");
        assert_eq!(
            prefix.values[":pk_prefix"],
            AttributeValue::S("cat-1#".to_string())
        );

        let equals = render_filter(&ScanFilter::AttributeEquals {
            name: "status".to_string(),
            value: Value::from("published"),
        })
        .unwrap();
        assert_eq!(equals.names["#attr"], "status");
    }

    #[test]
    fn test_empty_substitutions_are_none() {
        let condition = render_condition(Condition::ItemAbsent);
        assert!(condition.values().is_none());
        assert!(condition.names().is_some());
    }
}
