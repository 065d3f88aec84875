// libs/availability-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A bookable time slot owned by a provider.
///
/// `reservation_token` and `reserved_at` are `Some` iff `reserved` is true;
/// `version` is bumped on every effective state change and is the
/// optimistic-concurrency counter for the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reserved: bool,
    pub reservation_token: Option<String>,
    pub reserved_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AvailabilitySlot {
    /// Half-open interval overlap: [start, end) against [other.start, other.end).
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }
}

/// Wire representation of a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub slot_id: Uuid,
    pub provider_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reserved: bool,
    pub reservation_token: Option<String>,
    pub reserved_at: Option<DateTime<Utc>>,
    pub version: i64,
}

impl From<&AvailabilitySlot> for SlotView {
    fn from(slot: &AvailabilitySlot) -> Self {
        Self {
            slot_id: slot.id,
            provider_id: slot.provider_id,
            start_time: slot.start_time,
            end_time: slot.end_time,
            reserved: slot.reserved,
            reservation_token: slot.reservation_token.clone(),
            reserved_at: slot.reserved_at,
            version: slot.version,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSlotRequest {
    pub reservation_token: String,
}

/// Recurring availability command: date range x days-of-week x daily window,
/// cut into fixed-duration slots in the provider's timezone.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecurringSlotsRequest {
    pub provider_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_start_time: NaiveTime,
    pub daily_end_time: NaiveTime,
    pub slot_duration_minutes: u32,
    pub days_of_week: Vec<Weekday>,
    pub time_zone: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Availability slot not found: {0}")]
    SlotNotFound(Uuid),

    #[error("Slot {0} is already reserved by another booking attempt")]
    ReservationConflict(Uuid),

    #[error("Provider {provider_id} already has availability overlapping {start_time} - {end_time}")]
    Overlap {
        provider_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },

    #[error("Invalid availability request: {0}")]
    InvalidRequest(String),
}
