//! In-memory stand-in for DynamoDB, used by tests.
//!
//! Evaluates the same structured requests the real backend renders into
//! expressions: conditions, `SET` assignments, filters, key conditions and
//! `Limit`/`ExclusiveStartKey` pagination (limit counts examined items, as
//! the service does).

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use quill_core::storage::{KeyCondition, ReturnPolicy, ScanFilter, UpdateDescriptor};
use tokio::sync::RwLock;

use super::backend::{BackendError, DynamoBackend, RawPage};
use super::codec::{self, AttributeMap};
use super::expressions::Condition;
use super::keys::{key_from_attributes, PARTITION_KEY, SORT_KEY};

type TableKey = (String, String);
type Table = BTreeMap<TableKey, AttributeMap>;

#[derive(Default)]
pub struct InMemoryBackend {
    tables: RwLock<HashMap<String, Table>>,
    failures: Mutex<VecDeque<BackendError>>,
    update_clauses: Mutex<Vec<String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with the given exception name.
    pub fn fail_next(&self, code: &str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push_back(BackendError::new(code, format!("injected {code}")));
        }
    }

    /// Update clauses sent so far, oldest first.
    pub fn update_clauses(&self) -> Vec<String> {
        self.update_clauses
            .lock()
            .map(|clauses| clauses.clone())
            .unwrap_or_default()
    }

    /// Raw stored item, key attributes included.
    pub async fn raw_item(
        &self,
        table: &str,
        partition: &str,
        sort: Option<&str>,
    ) -> Option<AttributeMap> {
        let tables = self.tables.read().await;
        tables
            .get(table)?
            .get(&(partition.to_string(), sort.unwrap_or_default().to_string()))
            .cloned()
    }

    fn injected_failure(&self) -> Result<(), BackendError> {
        match self.failures.lock().ok().and_then(|mut f| f.pop_front()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn table_key(map: &AttributeMap) -> Result<TableKey, BackendError> {
    let string = |name: &str| map.get(name).and_then(|v| v.as_s().ok()).cloned();
    let partition = string(PARTITION_KEY).ok_or_else(|| {
        BackendError::new(
            "ValidationException",
            "The provided key element does not match the schema",
        )
    })?;
    Ok((partition, string(SORT_KEY).unwrap_or_default()))
}

fn check(condition: Option<Condition>, exists: bool) -> Result<(), BackendError> {
    let satisfied = match condition {
        None => true,
        Some(Condition::ItemExists) => exists,
        Some(Condition::ItemAbsent) => !exists,
    };
    if satisfied {
        Ok(())
    } else {
        Err(BackendError::new(
            "ConditionalCheckFailedException",
            "The conditional request failed",
        ))
    }
}

/// `in_range` selects the items `limit` counts; `keep` filters them afterwards.
fn paginate(
    table: Option<&Table>,
    limit: usize,
    exclusive_start_key: Option<AttributeMap>,
    in_range: impl Fn(&AttributeMap) -> bool,
    keep: impl Fn(&AttributeMap) -> bool,
) -> Result<RawPage, BackendError> {
    let Some(table) = table else {
        return Ok(RawPage::default());
    };
    let start = exclusive_start_key.as_ref().map(table_key).transpose()?;

    let mut remaining = table
        .iter()
        .filter(|(key, _)| start.as_ref().is_none_or(|start| *key > start))
        .filter(|(_, item)| in_range(*item))
        .peekable();

    let mut page = RawPage::default();
    let mut examined = 0;
    while examined < limit {
        let Some((_, item)) = remaining.next() else {
            break;
        };
        examined += 1;
        if keep(item) {
            page.items.push(item.clone());
        }
        if examined == limit && remaining.peek().is_some() {
            let mut last = AttributeMap::new();
            for name in [PARTITION_KEY, SORT_KEY] {
                if let Some(value) = item.get(name) {
                    last.insert(name.to_string(), value.clone());
                }
            }
            page.last_evaluated_key = Some(last);
        }
    }

    Ok(page)
}

#[async_trait]
impl DynamoBackend for InMemoryBackend {
    async fn get_item(
        &self,
        table: &str,
        key: AttributeMap,
    ) -> Result<Option<AttributeMap>, BackendError> {
        self.injected_failure()?;
        let key = table_key(&key)?;
        let tables = self.tables.read().await;
        Ok(tables.get(table).and_then(|t| t.get(&key)).cloned())
    }

    async fn put_item(
        &self,
        table: &str,
        item: AttributeMap,
        condition: Option<Condition>,
    ) -> Result<(), BackendError> {
        self.injected_failure()?;
        let key = table_key(&item)?;
        let mut tables = self.tables.write().await;
        let table = tables.entry(table.to_string()).or_default();
        check(condition, table.contains_key(&key))?;
        table.insert(key, item);
        Ok(())
    }

    async fn update_item(
        &self,
        table: &str,
        key: AttributeMap,
        update: &UpdateDescriptor,
        condition: Option<Condition>,
        returning: ReturnPolicy,
    ) -> Result<Option<AttributeMap>, BackendError> {
        self.injected_failure()?;
        let table_key = table_key(&key)?;
        let mut tables = self.tables.write().await;
        let table = tables.entry(table.to_string()).or_default();

        let old = table.get(&table_key).cloned();
        check(condition, old.is_some())?;

        let mut new = old.clone().unwrap_or(key);
        let mut updated = AttributeMap::new();
        for assignment in update.assignments() {
            let value = codec::encode(&assignment.value);
            updated.insert(assignment.field.clone(), value.clone());
            new.insert(assignment.field.clone(), value);
        }
        table.insert(table_key, new.clone());

        if let Ok(mut clauses) = self.update_clauses.lock() {
            clauses.push(update.clause().to_string());
        }

        Ok(match returning {
            ReturnPolicy::None => None,
            ReturnPolicy::AllNew => Some(new),
            ReturnPolicy::AllOld => old,
            ReturnPolicy::UpdatedNew => Some(updated),
        })
    }

    async fn delete_item(&self, table: &str, key: AttributeMap) -> Result<(), BackendError> {
        self.injected_failure()?;
        let key = table_key(&key)?;
        let mut tables = self.tables.write().await;
        if let Some(table) = tables.get_mut(table) {
            table.remove(&key);
        }
        Ok(())
    }

    async fn scan(
        &self,
        table: &str,
        filter: &ScanFilter,
        limit: usize,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<RawPage, BackendError> {
        self.injected_failure()?;
        let tables = self.tables.read().await;
        paginate(tables.get(table), limit, exclusive_start_key, |_| true, |item| {
            let Some(key) = key_from_attributes(item) else {
                return false;
            };
            let decoded = codec::decode_item(item, &[]).unwrap_or_default();
            filter.matches(&key, &decoded)
        })
    }

    async fn query(
        &self,
        table: &str,
        condition: &KeyCondition,
        limit: usize,
        exclusive_start_key: Option<AttributeMap>,
    ) -> Result<RawPage, BackendError> {
        self.injected_failure()?;
        let tables = self.tables.read().await;
        paginate(
            tables.get(table),
            limit,
            exclusive_start_key,
            |item| key_from_attributes(item).is_some_and(|key| condition.matches(&key)),
            |_| true,
        )
    }
}
