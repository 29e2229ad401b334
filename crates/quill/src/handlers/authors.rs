use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use quill_core::blog::{Author, CreateAuthorRequest, UpdateAuthorRequest};

use super::pagination::{ListQuery, ListResponse};
use crate::{handlers::AppError, state::AppState};

/// List authors one page at a time (GET /api/authors).
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Author>>, AppError> {
    let page = state
        .authors
        .list_page(query.limit(), query.cursor()?)
        .await?;
    Ok(Json(page.into()))
}

/// Create a new author (POST /api/authors).
pub async fn create_author(
    State(state): State<AppState>,
    Json(payload): Json<CreateAuthorRequest>,
) -> Result<impl IntoResponse, AppError> {
    let author = state.authors.create(payload.into_author(Utc::now())).await?;

    tracing::info!(author_id = %author.id, "Created author");

    Ok((StatusCode::CREATED, Json(author)))
}

/// Get a single author by ID (GET /api/authors/{id}).
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Author>, AppError> {
    let key = Author::key_for(&id)?;
    Ok(Json(state.authors.get(&key).await?))
}

/// Update an author by ID (PATCH /api/authors/{id}).
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAuthorRequest>,
) -> Result<Json<Author>, AppError> {
    let key = Author::key_for(&id)?;
    Ok(Json(state.authors.update(&key, payload.into()).await?))
}

/// Delete an author by ID (DELETE /api/authors/{id}).
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let key = Author::key_for(&id)?;
    state.authors.delete(&key).await?;

    tracing::info!(author_id = %id, "Deleted author");

    Ok(StatusCode::NO_CONTENT)
}
