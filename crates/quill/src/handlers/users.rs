use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use quill_core::blog::{CreateUserRequest, UpdateUserRequest, User};

use super::pagination::{ListQuery, ListResponse};
use crate::{handlers::AppError, state::AppState};

/// List users one page at a time (GET /api/users).
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<User>>, AppError> {
    let page = state
        .users
        .list_page(query.limit(), query.cursor()?)
        .await?;
    Ok(Json(page.into()))
}

/// Register a user (POST /api/users).
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.create(payload.into_user(Utc::now())).await?;

    tracing::info!(user_id = %user.id, role = %user.role.as_str(), "Created user");

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let key = User::key_for(&id)?;
    Ok(Json(state.users.get(&key).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    let key = User::key_for(&id)?;
    Ok(Json(state.users.update(&key, payload.into()).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let key = User::key_for(&id)?;
    state.users.delete(&key).await?;

    tracing::info!(user_id = %id, "Deleted user");

    Ok(StatusCode::NO_CONTENT)
}
