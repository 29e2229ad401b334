//! Provider-selection middleware.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use quill_core::provider::Provider;

use crate::state::AppState;

/// Header carrying the per-request provider hint.
pub const PROVIDER_HEADER: &str = "x-database-provider";

/// The raw hint, if the header is present and valid UTF-8.
fn provider_hint(headers: &HeaderMap) -> Option<&str> {
    headers.get(PROVIDER_HEADER).and_then(|v| v.to_str().ok())
}

/// Run the rest of the request with the hinted provider in scope.
///
/// An absent or unrecognized hint falls back to the configured default.
pub async fn provider_scope(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let hint = provider_hint(request.headers());
    let default = state.context.default_provider();
    let provider = Provider::resolve(hint, default);

    tracing::debug!(
        hint = hint.unwrap_or("<none>"),
        %provider,
        fallback = provider == default && hint.and_then(Provider::parse).is_none(),
        "Selected storage provider"
    );

    state.context.run(provider, next.run(request)).await
}
