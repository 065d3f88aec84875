// libs/availability-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AvailabilityError, AvailabilityQuery, CreateRecurringSlotsRequest, ReserveSlotRequest,
    SlotView,
};
use crate::services::availability::AvailabilityService;

#[axum::debug_handler]
pub async fn reserve_slot(
    State(service): State<Arc<AvailabilityService>>,
    Path(slot_id): Path<Uuid>,
    Json(request): Json<ReserveSlotRequest>,
) -> Result<Json<SlotView>, AppError> {
    let slot = service
        .reserve_slot(slot_id, &request.reservation_token)
        .await
        .map_err(map_availability_error)?;

    Ok(Json(slot))
}

#[axum::debug_handler]
pub async fn release_slot(
    State(service): State<Arc<AvailabilityService>>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<SlotView>, AppError> {
    let slot = service
        .release_slot(slot_id)
        .await
        .map_err(map_availability_error)?;

    Ok(Json(slot))
}

#[axum::debug_handler]
pub async fn create_recurring_slots(
    State(service): State<Arc<AvailabilityService>>,
    Json(request): Json<CreateRecurringSlotsRequest>,
) -> Result<(StatusCode, Json<Vec<SlotView>>), AppError> {
    let slots = service
        .create_recurring_slots(request)
        .await
        .map_err(map_availability_error)?;

    Ok((StatusCode::CREATED, Json(slots)))
}

#[axum::debug_handler]
pub async fn list_availability(
    State(service): State<Arc<AvailabilityService>>,
    Path(provider_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<SlotView>>, AppError> {
    let slots = service
        .list_availability(provider_id, query.from, query.to)
        .await;

    Ok(Json(slots))
}

fn map_availability_error(error: AvailabilityError) -> AppError {
    match error {
        AvailabilityError::SlotNotFound(slot_id) => {
            AppError::NotFound(format!("Availability slot not found: {}", slot_id))
        }
        AvailabilityError::ReservationConflict(slot_id) => {
            AppError::Conflict(format!("Slot {} is already reserved", slot_id))
        }
        AvailabilityError::Overlap { .. } => AppError::Conflict(error.to_string()),
        AvailabilityError::InvalidRequest(msg) => AppError::BadRequest(msg),
    }
}
