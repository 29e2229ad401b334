//! Notification handlers, nested under `/api/users/{user_id}`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use quill_core::blog::{
    CreateNotificationRequest, Notification, UpdateNotificationRequest, User,
};
use quill_core::storage::Patch;

use crate::{handlers::AppError, state::AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: usize,
}

async fn require_user(state: &AppState, user_id: &str) -> Result<(), AppError> {
    state.users.get(&User::key_for(user_id)?).await?;
    Ok(())
}

/// A user's notifications, optionally only the unread ones.
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    require_user(&state, &user_id).await?;

    let mut notifications = state.notifications.list_children(&user_id).await?;
    if query.unread_only {
        notifications.retain(|n| !n.is_read);
    }
    Ok(Json(notifications))
}

/// Notify an existing user. New notifications start unread.
pub async fn create_notification(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_user(&state, &user_id).await?;

    let notification = state
        .notifications
        .create(payload.into_notification(&user_id, Utc::now()))
        .await?;

    tracing::info!(
        %user_id,
        notification_id = %notification.notification_id,
        kind = %notification.kind.as_str(),
        "Created notification"
    );

    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn get_notification(
    State(state): State<AppState>,
    Path((user_id, notification_id)): Path<(String, String)>,
) -> Result<Json<Notification>, AppError> {
    let key = Notification::key_for(&user_id, &notification_id)?;
    Ok(Json(state.notifications.get(&key).await?))
}

pub async fn update_notification(
    State(state): State<AppState>,
    Path((user_id, notification_id)): Path<(String, String)>,
    Json(payload): Json<UpdateNotificationRequest>,
) -> Result<Json<Notification>, AppError> {
    let key = Notification::key_for(&user_id, &notification_id)?;
    Ok(Json(state.notifications.update(&key, payload.into()).await?))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Path((user_id, notification_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let key = Notification::key_for(&user_id, &notification_id)?;
    state.notifications.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark every unread notification of a user as read
/// (POST /api/users/{user_id}/notifications/read-all).
pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<MarkAllReadResponse>, AppError> {
    require_user(&state, &user_id).await?;

    let unread = state.notifications.list_children(&user_id).await?;
    let mut updated = 0;
    for notification in unread.iter().filter(|n| !n.is_read) {
        let key = Notification::key_for(&user_id, &notification.notification_id)?;
        let patch = Patch::new().set("isRead", true);
        state.notifications.update(&key, patch).await?;
        updated += 1;
    }

    tracing::info!(%user_id, updated, "Marked notifications read");

    Ok(Json(MarkAllReadResponse { updated }))
}
