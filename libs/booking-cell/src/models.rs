// libs/booking-cell/src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_cancellable(&self) -> bool {
        matches!(self, AppointmentStatus::Pending | AppointmentStatus::Confirmed)
    }

    /// Non-cancelled appointments hold their slot.
    pub fn is_active(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

/// A booked appointment. At most one non-cancelled appointment may reference
/// a given slot; the repository enforces that on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub slot_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// One-way door: CONFIRMED/PENDING -> CANCELLED. Returns false if the
    /// appointment is already cancelled.
    pub fn cancel(&mut self) -> bool {
        if !self.status.is_cancellable() {
            return false;
        }
        self.status = AppointmentStatus::Cancelled;
        self.updated_at = Utc::now();
        true
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub slot_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentConfirmation {
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub slot_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub message: String,
}

impl AppointmentConfirmation {
    pub fn from_appointment(appointment: &Appointment, message: &str) -> Self {
        Self {
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            slot_id: appointment.slot_id,
            appointment_date: appointment.appointment_date,
            start_time: appointment.start_time,
            status: appointment.status,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancellationRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationConfirmation {
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
    pub cancelled_at: DateTime<Utc>,
    pub message: String,
}

/// Downstream view of a slot, as returned by the availability service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotReservation {
    pub slot_id: Uuid,
    pub provider_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reserved: bool,
    pub reservation_token: Option<String>,
    pub reserved_at: Option<DateTime<Utc>>,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Slot {0} is not available")]
    SlotNotAvailable(Uuid),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(Uuid),

    #[error("Cannot cancel appointment with status: {0}")]
    CancellationNotAllowed(AppointmentStatus),

    #[error("Appointment {0} was modified concurrently")]
    ConcurrentModification(Uuid),

    #[error("Availability service is currently unavailable: {0}")]
    DownstreamUnavailable(String),

    #[error("Availability service error: {0}")]
    DownstreamError(String),

    #[error("Failed to persist appointment: {0}")]
    PersistenceFailed(String),
}
