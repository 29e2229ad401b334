//! DynamoDB repository implementation.
//!
//! Implements `ItemRepository` from `quill_core::storage` over one table.

use std::sync::Arc;

use async_trait::async_trait;

use quill_core::storage::{
    effective_limit, CompositeKey, Cursor, Item, ItemRepository, KeyCondition, Page, Patch,
    PutOptions, RepositoryError, Result, ReturnPolicy, ScanFilter, UpdateDescriptor,
};

use super::backend::{DynamoBackend, RawPage};
use super::codec::{decode_item, encode_item, AttributeMap};
use super::error::{map_backend_error, Operation};
use super::expressions::Condition;
use super::keys::{key_attributes, key_from_attributes, KEY_ATTRIBUTES};

/// DynamoDB-based repository for a single table.
///
/// Items are written with `PK`/`SK` taken from the composite key; those
/// attributes are stripped again on every read.
pub struct DynamoDbRepository {
    backend: Arc<dyn DynamoBackend>,
    table_name: String,
    entity_type: &'static str,
}

impl DynamoDbRepository {
    pub fn new(
        backend: Arc<dyn DynamoBackend>,
        table_name: impl Into<String>,
        entity_type: &'static str,
    ) -> Self {
        Self {
            backend,
            table_name: table_name.into(),
            entity_type,
        }
    }

    fn decode(&self, map: &AttributeMap) -> Result<Item> {
        Ok(decode_item(map, &KEY_ATTRIBUTES)?)
    }

    fn into_page(&self, raw: RawPage) -> Result<Page> {
        let items = raw
            .items
            .iter()
            .map(|map| self.decode(map))
            .collect::<Result<Vec<_>>>()?;

        let next = raw
            .last_evaluated_key
            .map(|last| {
                key_from_attributes(&last).map(Cursor::after).ok_or_else(|| {
                    RepositoryError::InvalidData("Malformed LastEvaluatedKey".to_string())
                })
            })
            .transpose()?;

        Ok(Page { items, next })
    }
}

#[async_trait]
impl ItemRepository for DynamoDbRepository {
    async fn get_item(&self, key: &CompositeKey) -> Result<Option<Item>> {
        tracing::debug!(table = %self.table_name, %key, "DynamoDB get_item");

        let found = self
            .backend
            .get_item(&self.table_name, key_attributes(key))
            .await
            .map_err(|e| map_backend_error(e, Operation::Get, self.entity_type, key.to_string()))?;

        found.map(|map| self.decode(&map)).transpose()
    }

    async fn put_item(&self, key: &CompositeKey, item: Item, options: PutOptions) -> Result<()> {
        tracing::debug!(
            table = %self.table_name,
            %key,
            if_not_exists = options.condition_not_exists,
            "DynamoDB put_item"
        );

        let mut wire = encode_item(&item);
        for attribute in KEY_ATTRIBUTES {
            wire.remove(attribute);
        }
        wire.extend(key_attributes(key));

        let condition = options
            .condition_not_exists
            .then_some(Condition::ItemAbsent);

        self.backend
            .put_item(&self.table_name, wire, condition)
            .await
            .map_err(|e| map_backend_error(e, Operation::Put, self.entity_type, key.to_string()))
    }

    async fn update_item(
        &self,
        key: &CompositeKey,
        patch: &Patch,
        exclude: &[&str],
        returning: ReturnPolicy,
    ) -> Result<Option<Item>> {
        let mut excluded = exclude.to_vec();
        excluded.extend(KEY_ATTRIBUTES);

        let Some(descriptor) = UpdateDescriptor::build(patch, &excluded) else {
            tracing::debug!(table = %self.table_name, %key, "Nothing to update, re-reading item");
            return match self.get_item(key).await? {
                Some(_) if returning == ReturnPolicy::None => Ok(None),
                Some(item) => Ok(Some(item)),
                None => Err(RepositoryError::NotFound {
                    entity_type: self.entity_type,
                    id: key.to_string(),
                }),
            };
        };

        tracing::debug!(
            table = %self.table_name,
            %key,
            clause = descriptor.clause(),
            "DynamoDB update_item"
        );

        let attributes = self
            .backend
            .update_item(
                &self.table_name,
                key_attributes(key),
                &descriptor,
                Some(Condition::ItemExists),
                returning,
            )
            .await
            .map_err(|e| {
                map_backend_error(e, Operation::Update, self.entity_type, key.to_string())
            })?;

        attributes.map(|map| self.decode(&map)).transpose()
    }

    async fn delete_item(&self, key: &CompositeKey) -> Result<()> {
        tracing::debug!(table = %self.table_name, %key, "DynamoDB delete_item");

        self.backend
            .delete_item(&self.table_name, key_attributes(key))
            .await
            .map_err(|e| map_backend_error(e, Operation::Delete, self.entity_type, key.to_string()))
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        limit: usize,
        cursor: Option<Cursor>,
    ) -> Result<Page> {
        tracing::debug!(table = %self.table_name, ?filter, limit, "DynamoDB scan");

        let raw = self
            .backend
            .scan(
                &self.table_name,
                filter,
                effective_limit(limit),
                cursor.map(|c| key_attributes(c.key())),
            )
            .await
            .map_err(|e| map_backend_error(e, Operation::Scan, self.entity_type, ""))?;

        self.into_page(raw)
    }

    async fn query(
        &self,
        condition: &KeyCondition,
        limit: usize,
        cursor: Option<Cursor>,
    ) -> Result<Page> {
        tracing::debug!(
            table = %self.table_name,
            partition = %condition.partition,
            limit,
            "DynamoDB query"
        );

        let raw = self
            .backend
            .query(
                &self.table_name,
                condition,
                effective_limit(limit),
                cursor.map(|c| key_attributes(c.key())),
            )
            .await
            .map_err(|e| {
                map_backend_error(e, Operation::Query, self.entity_type, &condition.partition)
            })?;

        self.into_page(raw)
    }
}
