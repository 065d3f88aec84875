use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Published by the booking cell after an appointment is persisted.
///
/// Delivery is at-least-once; consumers must deduplicate by `event_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentCreatedEvent {
    pub event_id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub slot_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentCancelledEvent {
    pub event_id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub slot_id: Uuid,
    pub appointment_date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub cancelled_at: DateTime<Utc>,
    pub reason: Option<String>,
}
