//! Comment handlers, nested under `/api/authors/{author_id}/posts/{post_id}`.
//!
//! Every handler first loads the post under its author, so a comment can
//! only be reached through the post it belongs to.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use quill_core::blog::{Comment, CreateCommentRequest, Post, UpdateCommentRequest};

use crate::{handlers::AppError, state::AppState};

async fn require_post(state: &AppState, author_id: &str, post_id: &str) -> Result<(), AppError> {
    state.posts.get(&Post::key_for(author_id, post_id)?).await?;
    Ok(())
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path((author_id, post_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, AppError> {
    require_post(&state, &author_id, &post_id).await?;
    Ok(Json(state.comments.list_children(&post_id).await?))
}

/// Add a comment to an existing post. New comments start unapproved.
pub async fn create_comment(
    State(state): State<AppState>,
    Path((author_id, post_id)): Path<(String, String)>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_post(&state, &author_id, &post_id).await?;

    let comment = state
        .comments
        .create(payload.into_comment(&post_id, Utc::now()))
        .await?;

    tracing::info!(%author_id, %post_id, comment_id = %comment.comment_id, "Created comment");

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path((author_id, post_id, comment_id)): Path<(String, String, String)>,
) -> Result<Json<Comment>, AppError> {
    require_post(&state, &author_id, &post_id).await?;
    let key = Comment::key_for(&post_id, &comment_id)?;
    Ok(Json(state.comments.get(&key).await?))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Path((author_id, post_id, comment_id)): Path<(String, String, String)>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    require_post(&state, &author_id, &post_id).await?;
    let key = Comment::key_for(&post_id, &comment_id)?;
    Ok(Json(state.comments.update(&key, payload.into()).await?))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((author_id, post_id, comment_id)): Path<(String, String, String)>,
) -> Result<StatusCode, AppError> {
    require_post(&state, &author_id, &post_id).await?;
    let key = Comment::key_for(&post_id, &comment_id)?;
    state.comments.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
