// libs/availability-cell/src/services/availability.rs
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    AvailabilityError, CreateRecurringSlotsRequest, SlotView,
};
use crate::services::generator::SlotGenerator;
use crate::services::store::SlotStore;

const DEFAULT_LOOKAHEAD_DAYS: i64 = 30;

/// Leaf authority for provider availability: owns the slot store and is the
/// only component that mutates reservation state. No cross-service calls.
pub struct AvailabilityService {
    store: SlotStore,
}

impl AvailabilityService {
    pub fn new() -> Self {
        Self {
            store: SlotStore::new(),
        }
    }

    /// Reserve a slot for a booking attempt identified by its idempotency
    /// token. Replays with the same token succeed without changing the row.
    pub async fn reserve_slot(
        &self,
        slot_id: Uuid,
        reservation_token: &str,
    ) -> Result<SlotView, AvailabilityError> {
        info!("Reserving slot {} for token {}", slot_id, reservation_token);

        let slot = self.store.reserve(slot_id, reservation_token).await?;
        Ok(SlotView::from(&slot))
    }

    /// Release a slot after a cancellation or a compensating rollback.
    /// Idempotent: releasing a free slot succeeds.
    pub async fn release_slot(&self, slot_id: Uuid) -> Result<SlotView, AvailabilityError> {
        info!("Releasing slot {}", slot_id);

        let slot = self.store.release(slot_id).await?;
        Ok(SlotView::from(&slot))
    }

    /// Expand a recurrence rule into concrete slots and store them
    /// atomically; any overlap with existing availability rejects the batch.
    pub async fn create_recurring_slots(
        &self,
        request: CreateRecurringSlotsRequest,
    ) -> Result<Vec<SlotView>, AvailabilityError> {
        validate_recurring_request(&request)?;

        let generated = SlotGenerator::generate(&request)?;
        if generated.is_empty() {
            warn!(
                "Recurring availability for provider {} produced no slots",
                request.provider_id
            );
        }

        let saved = self.store.insert_batch(generated).await?;
        info!(
            "Created {} availability slots for provider {}",
            saved.len(),
            request.provider_id
        );

        Ok(saved.iter().map(SlotView::from).collect())
    }

    pub async fn list_availability(
        &self,
        provider_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Vec<SlotView> {
        let effective_from = from.unwrap_or_else(Utc::now);
        let effective_to =
            to.unwrap_or_else(|| effective_from + ChronoDuration::days(DEFAULT_LOOKAHEAD_DAYS));

        debug!(
            "Listing availability for provider {} in [{}, {})",
            provider_id, effective_from, effective_to
        );

        self.store
            .list_range(provider_id, effective_from, effective_to)
            .await
            .iter()
            .map(SlotView::from)
            .collect()
    }
}

impl Default for AvailabilityService {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_recurring_request(
    request: &CreateRecurringSlotsRequest,
) -> Result<(), AvailabilityError> {
    if request.start_date > request.end_date {
        return Err(AvailabilityError::InvalidRequest(
            "startDate must not be after endDate".to_string(),
        ));
    }
    if request.daily_start_time >= request.daily_end_time {
        return Err(AvailabilityError::InvalidRequest(
            "dailyStartTime must be before dailyEndTime".to_string(),
        ));
    }
    if request.slot_duration_minutes == 0 {
        return Err(AvailabilityError::InvalidRequest(
            "slotDurationMinutes must be positive".to_string(),
        ));
    }
    if request.days_of_week.is_empty() {
        return Err(AvailabilityError::InvalidRequest(
            "daysOfWeek must not be empty".to_string(),
        ));
    }
    Ok(())
}
