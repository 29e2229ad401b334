//! Generic CRUD service for blog entities.
//!
//! The service owns the caller side of the repository contract: it checks
//! existence before updates and deletes, treats an update with nothing to
//! write as a read, and stamps `updatedAt` on every real write.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;

use quill_core::blog::Entity;
use quill_core::storage::{
    CompositeKey, Cursor, ItemRepository, Patch, PutOptions, RepositoryError, ReturnPolicy,
    ScanFilter, UpdateDescriptor, Value, DEFAULT_PAGE_SIZE,
};

use super::error::{Result, ServiceError};
use crate::storage::Stores;

/// One page of decoded entities.
#[derive(Debug)]
pub struct EntityPage<E> {
    pub items: Vec<E>,
    pub next: Option<Cursor>,
}

pub struct EntityService<E> {
    stores: Stores,
    entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            stores: self.stores.clone(),
            entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityService<E> {
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            entity: PhantomData,
        }
    }

    /// Repository for the ambient provider, resolved on every call.
    fn repository(&self) -> Arc<dyn ItemRepository> {
        self.stores.repository(E::COLLECTION)
    }

    fn not_found(key: &CompositeKey) -> RepositoryError {
        RepositoryError::NotFound {
            entity_type: E::COLLECTION.entity_type(),
            id: key.to_string(),
        }
    }

    /// Store a new entity. An entity with the same key is a `Conflict`.
    pub async fn create(&self, entity: E) -> Result<E> {
        let key = entity.key()?;
        tracing::info!(
            collection = %E::COLLECTION,
            %key,
            provider = %self.stores.context().provider(),
            "Creating entity"
        );

        self.repository()
            .put_item(&key, entity.to_item(), PutOptions::if_not_exists())
            .await?;
        Ok(entity)
    }

    pub async fn find(&self, key: &CompositeKey) -> Result<Option<E>> {
        let item = self.repository().get_item(key).await?;
        Ok(item.as_ref().map(E::from_item).transpose()?)
    }

    pub async fn get(&self, key: &CompositeKey) -> Result<E> {
        self.find(key)
            .await?
            .ok_or_else(|| ServiceError::from(Self::not_found(key)))
    }

    /// Apply `patch` to an existing entity.
    ///
    /// Immutable fields are never written. When nothing remains to write the
    /// current entity is returned unchanged.
    pub async fn update(&self, key: &CompositeKey, patch: Patch) -> Result<E> {
        let repo = self.repository();
        let current = repo.get_item(key).await?.ok_or_else(|| Self::not_found(key))?;

        if UpdateDescriptor::build(&patch, E::IMMUTABLE_FIELDS).is_none() {
            tracing::debug!(collection = %E::COLLECTION, %key, "Empty update, returning current");
            return Ok(E::from_item(&current)?);
        }

        let mut patch = patch;
        patch.insert("updatedAt", Some(Value::from(Utc::now().to_rfc3339())));

        let updated = repo
            .update_item(key, &patch, E::IMMUTABLE_FIELDS, ReturnPolicy::AllNew)
            .await?;
        match updated {
            Some(item) => Ok(E::from_item(&item)?),
            None => self.get(key).await,
        }
    }

    /// Delete an existing entity. A missing entity is `NotFound`.
    pub async fn delete(&self, key: &CompositeKey) -> Result<()> {
        let repo = self.repository();
        if repo.get_item(key).await?.is_none() {
            return Err(Self::not_found(key).into());
        }

        tracing::info!(collection = %E::COLLECTION, %key, "Deleting entity");
        repo.delete_item(key).await?;
        Ok(())
    }

    /// Every child of `parent`, following continuation cursors to the end.
    pub async fn list_children(&self, parent: &str) -> Result<Vec<E>> {
        let filter = ScanFilter::children_of(parent)?;
        let repo = self.repository();
        let mut entities = Vec::new();
        let mut cursor = None;

        loop {
            let page = repo.scan(&filter, DEFAULT_PAGE_SIZE, cursor).await?;
            for item in &page.items {
                entities.push(E::from_item(item)?);
            }
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(entities)
    }

    /// One page of the collection. A page may hold fewer than `limit` items
    /// while `next` is still set.
    pub async fn list_page(&self, limit: usize, cursor: Option<Cursor>) -> Result<EntityPage<E>> {
        let page = self.repository().scan(&ScanFilter::All, limit, cursor).await?;
        let items = page
            .items
            .iter()
            .map(E::from_item)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(EntityPage {
            items,
            next: page.next,
        })
    }
}
