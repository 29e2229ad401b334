//! Axum extractor for the active provider.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use quill_core::provider::{self, Provider};

use crate::state::AppState;

/// The provider in scope for this request.
///
/// Outside the provider middleware this is the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveProvider(pub Provider);

impl FromRequestParts<AppState> for ActiveProvider {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(
            provider::current().unwrap_or_else(|| state.context.default_provider()),
        ))
    }
}
