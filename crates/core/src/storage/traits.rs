use async_trait::async_trait;

use super::{
    CompositeKey, Cursor, Item, KeyCondition, Page, Patch, PutOptions, Result, ReturnPolicy,
    ScanFilter,
};

/// Backend-neutral data-access port over one collection.
///
/// Implementations hold no entity state and are safe to share between
/// concurrent requests.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Gets an item by key. Absence is `Ok(None)`.
    async fn get_item(&self, key: &CompositeKey) -> Result<Option<Item>>;

    /// Writes the whole item, replacing any previous one unless
    /// `options.condition_not_exists` is set.
    async fn put_item(&self, key: &CompositeKey, item: Item, options: PutOptions) -> Result<()>;

    /// Applies the effective fields of `patch` to an existing item.
    ///
    /// `exclude` names fields that must never be written (typically the
    /// entity's key fields). A missing item is `NotFound`. When nothing would
    /// be written the current item is re-read and returned.
    async fn update_item(
        &self,
        key: &CompositeKey,
        patch: &Patch,
        exclude: &[&str],
        returning: ReturnPolicy,
    ) -> Result<Option<Item>>;

    /// Deletes an item. Deleting a missing item succeeds.
    async fn delete_item(&self, key: &CompositeKey) -> Result<()>;

    /// Reads up to `limit` items matching `filter`, continuing after `cursor`.
    async fn scan(&self, filter: &ScanFilter, limit: usize, cursor: Option<Cursor>)
        -> Result<Page>;

    /// Reads up to `limit` items matching `condition`, continuing after `cursor`.
    async fn query(
        &self,
        condition: &KeyCondition,
        limit: usize,
        cursor: Option<Cursor>,
    ) -> Result<Page>;
}
