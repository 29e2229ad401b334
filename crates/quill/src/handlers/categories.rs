use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use quill_core::blog::{Category, CreateCategoryRequest, UpdateCategoryRequest};

use super::pagination::{ListQuery, ListResponse};
use crate::{handlers::AppError, state::AppState};

/// List categories one page at a time (GET /api/categories).
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<Category>>, AppError> {
    let page = state
        .categories
        .list_page(query.limit(), query.cursor()?)
        .await?;
    Ok(Json(page.into()))
}

/// Create a new category (POST /api/categories).
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let category = state
        .categories
        .create(payload.into_category(Utc::now()))
        .await?;

    tracing::info!(category_id = %category.id, name = %category.name, "Created category");

    Ok((StatusCode::CREATED, Json(category)))
}

/// Get a single category by ID (GET /api/categories/{id}).
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, AppError> {
    let key = Category::key_for(&id)?;
    Ok(Json(state.categories.get(&key).await?))
}

/// Update a category by ID (PATCH /api/categories/{id}).
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    let key = Category::key_for(&id)?;
    let category = state.categories.update(&key, payload.into()).await?;

    tracing::info!(category_id = %id, "Updated category");

    Ok(Json(category))
}

/// Delete a category by ID (DELETE /api/categories/{id}).
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let key = Category::key_for(&id)?;
    state.categories.delete(&key).await?;

    tracing::info!(category_id = %id, "Deleted category");

    Ok(StatusCode::NO_CONTENT)
}
