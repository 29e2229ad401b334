//! Storage backends and per-request repository selection.
//!
//! Both backends are built at startup. [`Stores::repository`] reads the
//! ambient provider on every call, so the same `Stores` value serves
//! requests that target different providers.

pub mod dynamodb;
pub mod sqlite;

use std::sync::Arc;

use quill_core::blog::Collection;
use quill_core::provider::{Provider, ProviderContext};
use quill_core::storage::{ItemRepository, Result};

use crate::config::{table_name, Config};
use dynamodb::{AwsDynamoBackend, DynamoBackend, DynamoDbRepository};
use sqlite::SqliteDatabase;

struct Repositories {
    categories: Arc<dyn ItemRepository>,
    subcategories: Arc<dyn ItemRepository>,
    authors: Arc<dyn ItemRepository>,
    posts: Arc<dyn ItemRepository>,
    comments: Arc<dyn ItemRepository>,
    users: Arc<dyn ItemRepository>,
    notifications: Arc<dyn ItemRepository>,
}

impl Repositories {
    fn build(make: impl Fn(Collection) -> Arc<dyn ItemRepository>) -> Self {
        Self {
            categories: make(Collection::Categories),
            subcategories: make(Collection::Subcategories),
            authors: make(Collection::Authors),
            posts: make(Collection::Posts),
            comments: make(Collection::Comments),
            users: make(Collection::Users),
            notifications: make(Collection::Notifications),
        }
    }

    fn get(&self, collection: Collection) -> &Arc<dyn ItemRepository> {
        match collection {
            Collection::Categories => &self.categories,
            Collection::Subcategories => &self.subcategories,
            Collection::Authors => &self.authors,
            Collection::Posts => &self.posts,
            Collection::Comments => &self.comments,
            Collection::Users => &self.users,
            Collection::Notifications => &self.notifications,
        }
    }
}

/// One repository per collection for each provider.
#[derive(Clone)]
pub struct Stores {
    context: ProviderContext,
    relational: Arc<Repositories>,
    wide_column: Arc<Repositories>,
}

impl Stores {
    /// Open the SQLite database and build the DynamoDB client from `config`.
    pub async fn connect(config: &Config) -> Result<Self> {
        let sqlite = SqliteDatabase::new(config.sqlite_path()).await?;
        let dynamo =
            AwsDynamoBackend::connect(&config.aws_region, config.dynamodb_endpoint.as_deref())
                .await;

        tracing::info!(
            sqlite = config.sqlite_path(),
            region = %config.aws_region,
            endpoint = ?config.dynamodb_endpoint,
            default_provider = %config.default_provider,
            tables = ?Collection::ALL.map(|c| config.table_name(c)),
            "Storage backends ready"
        );

        Ok(Self::from_parts(
            ProviderContext::new(config.default_provider),
            Arc::new(dynamo),
            &sqlite,
            config.table_prefix.as_deref(),
        ))
    }

    pub fn from_parts(
        context: ProviderContext,
        dynamo: Arc<dyn DynamoBackend>,
        sqlite: &SqliteDatabase,
        table_prefix: Option<&str>,
    ) -> Self {
        let relational = Repositories::build(|collection| {
            Arc::new(sqlite.repository(collection)) as Arc<dyn ItemRepository>
        });

        let wide_column = Repositories::build(|collection| {
            Arc::new(DynamoDbRepository::new(
                dynamo.clone(),
                table_name(table_prefix, collection),
                collection.entity_type(),
            )) as Arc<dyn ItemRepository>
        });

        Self {
            context,
            relational: Arc::new(relational),
            wide_column: Arc::new(wide_column),
        }
    }

    pub fn context(&self) -> ProviderContext {
        self.context
    }

    /// Repository for `collection` on the ambient provider.
    pub fn repository(&self, collection: Collection) -> Arc<dyn ItemRepository> {
        self.repository_for(self.context.provider(), collection)
    }

    pub fn repository_for(
        &self,
        provider: Provider,
        collection: Collection,
    ) -> Arc<dyn ItemRepository> {
        let repositories = match provider {
            Provider::Relational => &self.relational,
            Provider::WideColumn => &self.wide_column,
        };
        repositories.get(collection).clone()
    }

    /// Stores over an in-memory SQLite database and an in-memory DynamoDB
    /// backend, with tables named `test-<Collection>`.
    #[cfg(test)]
    pub(crate) async fn for_tests(
        default: Provider,
    ) -> (Arc<dynamodb::memory::InMemoryBackend>, Self) {
        let backend = Arc::new(dynamodb::memory::InMemoryBackend::new());
        let sqlite = SqliteDatabase::new_in_memory()
            .await
            .expect("in-memory SQLite");
        let stores = Self::from_parts(
            ProviderContext::new(default),
            backend.clone(),
            &sqlite,
            Some("test-"),
        );
        (backend, stores)
    }
}
