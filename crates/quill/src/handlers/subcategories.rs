use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use quill_core::blog::{Category, CreateSubcategoryRequest, Subcategory, UpdateSubcategoryRequest};

use crate::{handlers::AppError, state::AppState};

/// List the subcategories of a category (GET /api/categories/{category_id}/subcategories).
pub async fn list_subcategories(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Vec<Subcategory>>, AppError> {
    Ok(Json(state.subcategories.list_children(&category_id).await?))
}

/// Create a subcategory under an existing category.
pub async fn create_subcategory(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Json(payload): Json<CreateSubcategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .categories
        .get(&Category::key_for(&category_id)?)
        .await?;

    let subcategory = state
        .subcategories
        .create(payload.into_subcategory(&category_id, Utc::now()))
        .await?;

    tracing::info!(
        category_id = %category_id,
        subcategory_id = %subcategory.subcategory_id,
        "Created subcategory"
    );

    Ok((StatusCode::CREATED, Json(subcategory)))
}

pub async fn get_subcategory(
    State(state): State<AppState>,
    Path((category_id, subcategory_id)): Path<(String, String)>,
) -> Result<Json<Subcategory>, AppError> {
    let key = Subcategory::key_for(&category_id, &subcategory_id)?;
    Ok(Json(state.subcategories.get(&key).await?))
}

pub async fn update_subcategory(
    State(state): State<AppState>,
    Path((category_id, subcategory_id)): Path<(String, String)>,
    Json(payload): Json<UpdateSubcategoryRequest>,
) -> Result<Json<Subcategory>, AppError> {
    let key = Subcategory::key_for(&category_id, &subcategory_id)?;
    Ok(Json(state.subcategories.update(&key, payload.into()).await?))
}

pub async fn delete_subcategory(
    State(state): State<AppState>,
    Path((category_id, subcategory_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let key = Subcategory::key_for(&category_id, &subcategory_id)?;
    state.subcategories.delete(&key).await?;

    tracing::info!(%category_id, %subcategory_id, "Deleted subcategory");

    Ok(StatusCode::NO_CONTENT)
}
