use axum::{extract::State, Json};

use quill_core::provider::EnvironmentInfo;

use crate::state::AppState;

/// Describe the store selected for this request (GET /api/database).
pub async fn database_info(State(state): State<AppState>) -> Json<EnvironmentInfo> {
    Json(
        state
            .context
            .environment_info(state.dynamodb_endpoint.as_deref()),
    )
}
