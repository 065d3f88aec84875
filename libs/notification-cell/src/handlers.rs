// libs/notification-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::NotificationLog;
use crate::services::notification::NotificationService;

#[axum::debug_handler]
pub async fn list_user_notifications(
    State(service): State<Arc<NotificationService>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<NotificationLog>>, AppError> {
    let logs = service.list_user_notifications(user_id).await;
    Ok(Json(logs))
}
