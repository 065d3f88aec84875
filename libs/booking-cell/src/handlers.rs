// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    Appointment, AppointmentConfirmation, BookingError, BookingRequest, CancellationConfirmation,
    CancellationRequest,
};
use crate::services::booking::BookingService;

#[axum::debug_handler]
pub async fn book_appointment(
    State(service): State<Arc<BookingService>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<AppointmentConfirmation>), AppError> {
    let confirmation = service
        .book_appointment(request)
        .await
        .map_err(map_booking_error)?;

    Ok((StatusCode::CREATED, Json(confirmation)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(service): State<Arc<BookingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancellationRequest>,
) -> Result<Json<CancellationConfirmation>, AppError> {
    let confirmation = service
        .cancel_appointment(appointment_id, request.reason)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(confirmation))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(service): State<Arc<BookingService>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(service): State<Arc<BookingService>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = service
        .list_patient_appointments(patient_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(appointments))
}

fn map_booking_error(error: BookingError) -> AppError {
    match error {
        BookingError::SlotNotAvailable(slot_id) => {
            AppError::Conflict(format!("Slot {} is not available", slot_id))
        }
        BookingError::AppointmentNotFound(id) => {
            AppError::NotFound(format!("Appointment not found: {}", id))
        }
        BookingError::CancellationNotAllowed(status) => {
            AppError::Conflict(format!("Cannot cancel appointment with status: {}", status))
        }
        BookingError::ConcurrentModification(id) => {
            AppError::Conflict(format!("Appointment {} was modified concurrently", id))
        }
        BookingError::DownstreamUnavailable(msg) => AppError::ServiceUnavailable(msg),
        BookingError::DownstreamError(msg) => AppError::ExternalService(msg),
        BookingError::PersistenceFailed(msg) => AppError::Internal(msg),
    }
}
