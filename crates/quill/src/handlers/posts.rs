use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use quill_core::blog::{Author, CreatePostRequest, Post, UpdatePostRequest};

use crate::{handlers::AppError, state::AppState};

/// List an author's posts (GET /api/authors/{author_id}/posts).
pub async fn list_posts(
    State(state): State<AppState>,
    Path(author_id): Path<String>,
) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(state.posts.list_children(&author_id).await?))
}

/// Create a post for an existing author (POST /api/authors/{author_id}/posts).
pub async fn create_post(
    State(state): State<AppState>,
    Path(author_id): Path<String>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.authors.get(&Author::key_for(&author_id)?).await?;

    let post = state
        .posts
        .create(payload.into_post(&author_id, Utc::now()))
        .await?;

    tracing::info!(%author_id, post_id = %post.post_id, status = %post.status, "Created post");

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path((author_id, post_id)): Path<(String, String)>,
) -> Result<Json<Post>, AppError> {
    let key = Post::key_for(&author_id, &post_id)?;
    Ok(Json(state.posts.get(&key).await?))
}

/// Update a post (PATCH /api/authors/{author_id}/posts/{post_id}).
///
/// Publishing a post stamps `publishedAt`.
pub async fn update_post(
    State(state): State<AppState>,
    Path((author_id, post_id)): Path<(String, String)>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, AppError> {
    let key = Post::key_for(&author_id, &post_id)?;
    let post = state
        .posts
        .update(&key, payload.into_patch(Utc::now()))
        .await?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path((author_id, post_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let key = Post::key_for(&author_id, &post_id)?;
    state.posts.delete(&key).await?;

    tracing::info!(%author_id, %post_id, "Deleted post");

    Ok(StatusCode::NO_CONTENT)
}
