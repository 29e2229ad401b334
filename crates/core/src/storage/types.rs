use std::fmt;

use super::{keys, Item, Value};

/// Default page size for scans and queries.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// A zero limit means the default page size.
pub fn effective_limit(limit: usize) -> usize {
    if limit == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        limit
    }
}

/// The key of a stored item.
///
/// For hierarchical entities `partition` already embeds the parent and child
/// ids and `sort` repeats the child id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey {
    pub partition: String,
    pub sort: Option<String>,
}

impl CompositeKey {
    pub fn flat(id: impl Into<String>) -> Self {
        Self {
            partition: id.into(),
            sort: None,
        }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.partition)
    }
}

/// Options for `put_item`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Fail with `Conflict` instead of overwriting an existing item.
    pub condition_not_exists: bool,
}

impl PutOptions {
    pub fn if_not_exists() -> Self {
        Self {
            condition_not_exists: true,
        }
    }
}

/// Which image of the item an update returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnPolicy {
    None,
    #[default]
    AllNew,
    AllOld,
    UpdatedNew,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortCondition {
    Equals(String),
    BeginsWith(String),
}

impl SortCondition {
    pub fn matches(&self, sort: Option<&str>) -> bool {
        match (self, sort) {
            (SortCondition::Equals(expected), Some(sort)) => sort == expected,
            (SortCondition::BeginsWith(prefix), Some(sort)) => sort.starts_with(prefix.as_str()),
            (_, None) => false,
        }
    }
}

/// Key condition for `query`: exact partition, optional sort constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCondition {
    pub partition: String,
    pub sort: Option<SortCondition>,
}

impl KeyCondition {
    pub fn partition(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: SortCondition) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn matches(&self, key: &CompositeKey) -> bool {
        key.partition == self.partition
            && self
                .sort
                .as_ref()
                .is_none_or(|cond| cond.matches(key.sort.as_deref()))
    }
}

/// Filter applied by `scan`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScanFilter {
    #[default]
    All,
    /// Items whose partition starts with the prefix.
    PartitionPrefix(String),
    /// Items whose attribute equals the value.
    AttributeEquals { name: String, value: Value },
}

impl ScanFilter {
    /// Every child of `parent` in a hierarchical collection.
    pub fn children_of(parent: &str) -> Result<Self, super::KeyError> {
        keys::child_prefix(parent).map(ScanFilter::PartitionPrefix)
    }

    pub fn matches(&self, key: &CompositeKey, item: &Item) -> bool {
        match self {
            ScanFilter::All => true,
            ScanFilter::PartitionPrefix(prefix) => key.partition.starts_with(prefix.as_str()),
            ScanFilter::AttributeEquals { name, value } => item.get(name) == Some(value),
        }
    }
}

/// Opaque continuation token: the key of the last item of the previous page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(CompositeKey);

impl Cursor {
    pub fn after(key: CompositeKey) -> Self {
        Self(key)
    }

    pub fn key(&self) -> &CompositeKey {
        &self.0
    }

    pub fn into_key(self) -> CompositeKey {
        self.0
    }
}

/// One page of results. `next` is `Some` while more items may follow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    pub next: Option<Cursor>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}
