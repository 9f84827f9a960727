//! HTTP handlers for notification endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::NotificationPreferences;
use crate::services::notification::{NotificationRow, UpdatePreferencesInput};
use crate::AppState;

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// Get the current user's notification preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<NotificationPreferences>> {
    let service = state.notification_service();
    let prefs = service.preferences(current_user.0.user_id).await?;
    Ok(Json(prefs))
}

/// Update the current user's notification preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdatePreferencesInput>,
) -> AppResult<Json<NotificationPreferences>> {
    let service = state.notification_service();
    let prefs = service
        .update_preferences(current_user.0.user_id, input)
        .await?;
    Ok(Json(prefs))
}

/// List the current user's in-app notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<NotificationListQuery>,
) -> AppResult<Json<Vec<NotificationRow>>> {
    let service = state.notification_service();
    let notifications = service
        .list_for_user(current_user.0.user_id, query.unread_only)
        .await?;
    Ok(Json(notifications))
}

/// Mark one of the current user's notifications as read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<NotificationRow>> {
    let service = state.notification_service();
    let notification = service
        .mark_read(current_user.0.user_id, notification_id)
        .await?;
    Ok(Json(notification))
}
