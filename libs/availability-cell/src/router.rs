// libs/availability-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers;
use crate::services::availability::AvailabilityService;

pub fn availability_routes(service: Arc<AvailabilityService>) -> Router {
    Router::new()
        .route("/{slot_id}/reserve", put(handlers::reserve_slot))
        .route("/{slot_id}/release", put(handlers::release_slot))
        .route("/recurring", post(handlers::create_recurring_slots))
        .route("/provider/{provider_id}", get(handlers::list_availability))
        .with_state(service)
}
