use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use availability_cell::{availability_routes, AvailabilityService};
use booking_cell::{appointment_routes, BookingService};
use notification_cell::{notification_routes, NotificationService};

pub fn create_router(
    availability: Arc<AvailabilityService>,
    booking: Arc<BookingService>,
    notifications: Arc<NotificationService>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "mediapp API is running!" }))
        .nest("/api/v1/availability", availability_routes(availability))
        .nest("/api/v1/appointments", appointment_routes(booking))
        .nest("/api/v1/notifications", notification_routes(notifications))
}
