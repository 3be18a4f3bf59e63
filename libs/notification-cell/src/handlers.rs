use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::NotificationListQuery;
use crate::services::inbox::InboxService;

fn caller_id(user: &User) -> Result<Uuid, AppError> {
    user.uuid()
        .ok_or_else(|| AppError::Auth("Invalid user id in token".to_string()))
}

#[axum::debug_handler]
pub async fn get_notifications(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<NotificationListQuery>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_id = caller_id(&user)?;

    let inbox = InboxService::new(&state);
    let notifications = inbox.list(user_id, query.unread.unwrap_or(false)).await?;

    Ok(Json(json!({ "ok": true, "data": notifications })))
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<Arc<AppConfig>>,
    Path(notification_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_id = caller_id(&user)?;

    let inbox = InboxService::new(&state);
    let notification = inbox
        .mark_read(user_id, notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    Ok(Json(json!({ "ok": true, "data": notification })))
}
