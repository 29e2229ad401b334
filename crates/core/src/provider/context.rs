//! Ambient, task-scoped provider selection.
//!
//! The active provider lives in a tokio task-local. A scope opened with
//! [`ProviderContext::run`] is visible to everything polled inside the wrapped
//! future, across any number of `.await` points, and is restored when that
//! future completes, panics or is dropped. Tasks spawned from inside a scope
//! do not inherit it.

use std::cell::Cell;
use std::future::Future;

use super::{EnvironmentInfo, Provider};

tokio::task_local! {
    static ACTIVE_PROVIDER: Cell<Provider>;
}

/// The provider of the innermost enclosing scope, if any.
pub fn current() -> Option<Provider> {
    ACTIVE_PROVIDER.try_with(Cell::get).ok()
}

/// Handle onto the ambient provider, carrying the process-wide default used
/// when no scope is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderContext {
    default: Provider,
}

impl ProviderContext {
    pub fn new(default: Provider) -> Self {
        Self { default }
    }

    pub fn default_provider(&self) -> Provider {
        self.default
    }

    /// Run `future` with `provider` as the ambient provider.
    pub async fn run<F>(&self, provider: Provider, future: F) -> F::Output
    where
        F: Future,
    {
        ACTIVE_PROVIDER.scope(Cell::new(provider), future).await
    }

    /// Run a synchronous closure with `provider` as the ambient provider.
    pub fn run_sync<R>(&self, provider: Provider, f: impl FnOnce() -> R) -> R {
        ACTIVE_PROVIDER.sync_scope(Cell::new(provider), f)
    }

    /// The ambient provider, or the configured default outside any scope.
    pub fn provider(&self) -> Provider {
        current().unwrap_or(self.default)
    }

    /// Replace the provider of the current scope.
    ///
    /// Outside a scope this does nothing and returns `false`.
    pub fn set_provider(&self, provider: Provider) -> bool {
        ACTIVE_PROVIDER.try_with(|cell| cell.set(provider)).is_ok()
    }

    pub fn is_relational(&self) -> bool {
        self.provider() == Provider::Relational
    }

    pub fn is_wide_column(&self) -> bool {
        self.provider() == Provider::WideColumn
    }

    /// Describe the store selected for the current scope.
    pub fn environment_info(&self, wide_column_endpoint: Option<&str>) -> EnvironmentInfo {
        EnvironmentInfo::new(self.provider(), wide_column_endpoint)
    }
}
