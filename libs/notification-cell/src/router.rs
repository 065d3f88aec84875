// libs/notification-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::services::notification::NotificationService;

pub fn notification_routes(service: Arc<NotificationService>) -> Router {
    Router::new()
        .route("/users/{user_id}", get(handlers::list_user_notifications))
        .with_state(service)
}
