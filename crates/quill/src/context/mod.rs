//! Request-scoped provider selection.
//!
//! [`provider_scope`] reads the `x-database-provider` header and runs the
//! rest of the request inside a [`ProviderContext`] scope. Handlers can read
//! the decision back with the [`ActiveProvider`] extractor.
//!
//! [`ProviderContext`]: quill_core::provider::ProviderContext

mod extractor;
mod interceptor;

pub use extractor::ActiveProvider;
pub use interceptor::{provider_scope, PROVIDER_HEADER};
