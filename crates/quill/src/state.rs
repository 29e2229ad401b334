//! Application state shared by every request handler.

use quill_core::blog::{Author, Category, Comment, Notification, Post, Subcategory, User};
use quill_core::provider::ProviderContext;

use crate::services::EntityService;
use crate::storage::Stores;

/// Shared application state.
///
/// Cloned for each request. Services resolve their repository from the
/// ambient provider at call time, so one state serves every provider.
#[derive(Clone)]
pub struct AppState {
    pub context: ProviderContext,
    /// Local DynamoDB endpoint, reported by `/api/database`.
    pub dynamodb_endpoint: Option<String>,
    pub categories: EntityService<Category>,
    pub subcategories: EntityService<Subcategory>,
    pub authors: EntityService<Author>,
    pub posts: EntityService<Post>,
    pub comments: EntityService<Comment>,
    pub users: EntityService<User>,
    pub notifications: EntityService<Notification>,
}

impl AppState {
    pub fn new(stores: Stores, dynamodb_endpoint: Option<String>) -> Self {
        Self {
            context: stores.context(),
            dynamodb_endpoint,
            categories: EntityService::new(stores.clone()),
            subcategories: EntityService::new(stores.clone()),
            authors: EntityService::new(stores.clone()),
            posts: EntityService::new(stores.clone()),
            comments: EntityService::new(stores.clone()),
            users: EntityService::new(stores.clone()),
            notifications: EntityService::new(stores),
        }
    }

    /// State over in-memory backends for router tests.
    #[cfg(test)]
    pub(crate) async fn for_tests(
        default: quill_core::provider::Provider,
    ) -> (
        std::sync::Arc<crate::storage::dynamodb::memory::InMemoryBackend>,
        Self,
    ) {
        let (backend, stores) = Stores::for_tests(default).await;
        (backend, Self::new(stores, Some("http://localhost:8000".to_string())))
    }
}
