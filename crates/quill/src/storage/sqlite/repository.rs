//! SQLite repository implementation.
//!
//! Implements `ItemRepository` from `quill_core::storage` over the shared
//! `items` table, scoped to one collection.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use quill_core::blog::Collection;
use quill_core::storage::{
    effective_limit, CompositeKey, Cursor, Item, ItemRepository, KeyCondition, Page, Patch,
    PutOptions, RepositoryError, Result, ReturnPolicy, ScanFilter, SortCondition,
};

use super::conversions::{
    decode_body, encode_body, format_datetime, key_from_columns, sort_column,
};
use super::error::{abort, map_tokio_rusqlite_error, wrap_err};
use super::schema;

/// Raw `(pk, sk, body)` row.
type Row = (String, String, String);

/// SQLite-based repository for a single collection.
pub struct SqliteRepository {
    conn: Connection,
    collection: &'static str,
    entity_type: &'static str,
}

impl SqliteRepository {
    pub fn new(conn: Connection, collection: Collection) -> Self {
        Self {
            conn,
            collection: collection.as_str(),
            entity_type: collection.entity_type(),
        }
    }

    fn not_found(&self, key: &CompositeKey) -> RepositoryError {
        RepositoryError::NotFound {
            entity_type: self.entity_type,
            id: key.to_string(),
        }
    }

    /// Decodes up to `limit` rows; the last of `limit` rows becomes the cursor
    /// when the query returned one more.
    fn into_page(
        &self,
        mut rows: Vec<Row>,
        limit: usize,
        keep: impl Fn(&CompositeKey, &Item) -> bool,
    ) -> Result<Page> {
        let more = rows.len() > limit;
        rows.truncate(limit);

        let mut items = Vec::with_capacity(rows.len());
        let mut last = None;
        for (pk, sk, body) in rows {
            let key = key_from_columns(pk, sk);
            let item = decode_body(&body)?;
            if keep(&key, &item) {
                items.push(item);
            }
            last = Some(key);
        }

        let next = if more { last.map(Cursor::after) } else { None };
        Ok(Page { items, next })
    }
}

/// Rows matching `sql`; `params` must end with the row limit.
fn collect_rows(
    conn: &rusqlite::Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> tokio_rusqlite::Result<Vec<Row>> {
    let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
    let rows = stmt
        .query_map(params, |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .map_err(wrap_err)?;

    let mut out = Vec::new();
    for row_result in rows {
        out.push(row_result.map_err(wrap_err)?);
    }
    Ok(out)
}

#[async_trait]
impl ItemRepository for SqliteRepository {
    async fn get_item(&self, key: &CompositeKey) -> Result<Option<Item>> {
        tracing::debug!(collection = self.collection, %key, "SQLite get_item");

        let collection = self.collection;
        let pk = key.partition.clone();
        let sk = sort_column(key);

        let body = self
            .conn
            .call(move |conn| {
                conn.query_row(schema::SELECT_ITEM, params![collection, pk, sk], |row| {
                    row.get::<_, String>(0)
                })
                .optional()
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, self.entity_type, key.to_string()))?;

        body.as_deref().map(decode_body).transpose()
    }

    async fn put_item(&self, key: &CompositeKey, item: Item, options: PutOptions) -> Result<()> {
        tracing::debug!(
            collection = self.collection,
            %key,
            if_not_exists = options.condition_not_exists,
            "SQLite put_item"
        );

        let collection = self.collection;
        let pk = key.partition.clone();
        let sk = sort_column(key);
        let body = encode_body(&item)?;
        let updated_at = format_datetime(&Utc::now());
        let sql = if options.condition_not_exists {
            schema::INSERT_ITEM
        } else {
            schema::UPSERT_ITEM
        };

        self.conn
            .call(move |conn| {
                conn.execute(sql, params![collection, pk, sk, body, updated_at])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, self.entity_type, key.to_string()))
    }

    async fn update_item(
        &self,
        key: &CompositeKey,
        patch: &Patch,
        exclude: &[&str],
        returning: ReturnPolicy,
    ) -> Result<Option<Item>> {
        tracing::debug!(
            collection = self.collection,
            %key,
            fields = patch.len(),
            "SQLite update_item"
        );

        let written: Item = patch
            .effective_fields(exclude)
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect();
        let collection = self.collection;
        let pk = key.partition.clone();
        let sk = sort_column(key);
        let patch = patch.clone();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        let updated_at = format_datetime(&Utc::now());

        // Read, merge and write inside one transaction.
        let outcome = self
            .conn
            .call(move |conn| {
                let exclude: Vec<&str> = exclude.iter().map(String::as_str).collect();
                let tx = conn.transaction().map_err(wrap_err)?;

                let body: Option<String> = tx
                    .query_row(schema::SELECT_ITEM, params![collection, pk, sk], |row| {
                        row.get(0)
                    })
                    .optional()
                    .map_err(wrap_err)?;
                let Some(body) = body else {
                    return Ok(None);
                };

                let old = decode_body(&body).map_err(abort)?;
                if !patch.has_effective_fields(&exclude) {
                    return Ok(Some((old.clone(), old)));
                }

                let mut new = old.clone();
                patch.apply_to(&mut new, &exclude);
                let new_body = encode_body(&new).map_err(abort)?;
                tx.execute(
                    schema::UPDATE_ITEM_BODY,
                    params![collection, pk, sk, new_body, updated_at],
                )
                .map_err(wrap_err)?;
                tx.commit().map_err(wrap_err)?;

                Ok(Some((old, new)))
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, self.entity_type, key.to_string()))?;

        let Some((old, new)) = outcome else {
            return Err(self.not_found(key));
        };

        Ok(match returning {
            ReturnPolicy::None => None,
            ReturnPolicy::AllNew => Some(new),
            ReturnPolicy::AllOld => Some(old),
            // Every written field, changed or not. Nothing written reads back the item.
            ReturnPolicy::UpdatedNew if written.is_empty() => Some(new),
            ReturnPolicy::UpdatedNew => Some(written),
        })
    }

    async fn delete_item(&self, key: &CompositeKey) -> Result<()> {
        tracing::debug!(collection = self.collection, %key, "SQLite delete_item");

        let collection = self.collection;
        let pk = key.partition.clone();
        let sk = sort_column(key);

        self.conn
            .call(move |conn| {
                conn.execute(schema::DELETE_ITEM, params![collection, pk, sk])
                    .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, self.entity_type, key.to_string()))
    }

    async fn scan(
        &self,
        filter: &ScanFilter,
        limit: usize,
        cursor: Option<Cursor>,
    ) -> Result<Page> {
        tracing::debug!(collection = self.collection, ?filter, limit, "SQLite scan");

        let limit = effective_limit(limit);
        let collection = self.collection;
        let (after_pk, after_sk) = match cursor {
            Some(cursor) => {
                let key = cursor.into_key();
                let sk = sort_column(&key);
                (Some(key.partition), Some(sk))
            }
            None => (None, None),
        };
        let prefix = match filter {
            ScanFilter::PartitionPrefix(prefix) => Some(prefix.clone()),
            _ => None,
        };
        let fetch = i64::try_from(limit + 1).unwrap_or(i64::MAX);

        let rows = self
            .conn
            .call(move |conn| {
                collect_rows(
                    conn,
                    schema::SCAN_ITEMS,
                    params![collection, after_pk, after_sk, prefix, fetch],
                )
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, self.entity_type, ""))?;

        self.into_page(rows, limit, |key, item| filter.matches(key, item))
    }

    async fn query(
        &self,
        condition: &KeyCondition,
        limit: usize,
        cursor: Option<Cursor>,
    ) -> Result<Page> {
        tracing::debug!(
            collection = self.collection,
            partition = %condition.partition,
            limit,
            "SQLite query"
        );

        let limit = effective_limit(limit);
        let collection = self.collection;
        let pk = condition.partition.clone();
        let after_sk = cursor.map(|c| sort_column(c.key()));
        let (sort_equals, sort_prefix) = match &condition.sort {
            Some(SortCondition::Equals(sort)) => (Some(sort.clone()), None),
            Some(SortCondition::BeginsWith(prefix)) => (None, Some(prefix.clone())),
            None => (None, None),
        };
        let fetch = i64::try_from(limit + 1).unwrap_or(i64::MAX);

        let rows = self
            .conn
            .call(move |conn| {
                collect_rows(
                    conn,
                    schema::QUERY_ITEMS,
                    params![collection, pk, after_sk, sort_equals, sort_prefix, fetch],
                )
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error(e, self.entity_type, &condition.partition))?;

        self.into_page(rows, limit, |key, _| condition.matches(key))
    }
}
