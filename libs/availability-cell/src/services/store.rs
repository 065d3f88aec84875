use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{AvailabilitySlot, AvailabilityError};

/// Row-versioned store for availability slots.
///
/// All mutation of `reserved`/`reservation_token`/`version` goes through
/// `reserve` and `release`; nothing else writes those fields. Each mutation
/// runs entirely under the write lock, which stands in for the row-level
/// atomicity of a database's conditional UPDATE: two concurrent reserve
/// calls for the same slot serialize here and exactly one can observe the
/// slot free.
pub struct SlotStore {
    rows: RwLock<HashMap<Uuid, AvailabilitySlot>>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Atomic conditional reservation.
    ///
    /// Succeeds when the slot is free, or when it is already held by the
    /// same `reservation_token` (a replayed retry of the same booking
    /// attempt). A replay returns the row untouched: `reserved_at` keeps the
    /// original timestamp and `version` is not bumped a second time.
    pub async fn reserve(
        &self,
        slot_id: Uuid,
        reservation_token: &str,
    ) -> Result<AvailabilitySlot, AvailabilityError> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .get_mut(&slot_id)
            .ok_or(AvailabilityError::SlotNotFound(slot_id))?;

        if slot.reserved {
            if slot.reservation_token.as_deref() == Some(reservation_token) {
                return Ok(slot.clone());
            }
            return Err(AvailabilityError::ReservationConflict(slot_id));
        }

        let now = Utc::now();
        slot.reserved = true;
        slot.reservation_token = Some(reservation_token.to_string());
        slot.reserved_at = Some(now);
        slot.version += 1;
        slot.updated_at = now;

        Ok(slot.clone())
    }

    /// Idempotent release: releasing a free slot is a no-op success, because
    /// compensations may be retried.
    pub async fn release(&self, slot_id: Uuid) -> Result<AvailabilitySlot, AvailabilityError> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .get_mut(&slot_id)
            .ok_or(AvailabilityError::SlotNotFound(slot_id))?;

        if !slot.reserved {
            return Ok(slot.clone());
        }

        slot.reserved = false;
        slot.reservation_token = None;
        slot.reserved_at = None;
        slot.version += 1;
        slot.updated_at = Utc::now();

        Ok(slot.clone())
    }

    /// All-or-nothing insert: if any new slot overlaps an existing slot of
    /// the same provider, the whole batch is rejected and nothing is stored.
    pub async fn insert_batch(
        &self,
        slots: Vec<AvailabilitySlot>,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        let mut rows = self.rows.write().await;

        for slot in &slots {
            let collision = rows.values().any(|existing| {
                existing.provider_id == slot.provider_id
                    && existing.overlaps(slot.start_time, slot.end_time)
            });
            if collision {
                return Err(AvailabilityError::Overlap {
                    provider_id: slot.provider_id,
                    start_time: slot.start_time,
                    end_time: slot.end_time,
                });
            }
        }

        for slot in &slots {
            rows.insert(slot.id, slot.clone());
        }

        Ok(slots)
    }

    /// Slots of `provider_id` starting within [from, to), sorted by start time.
    pub async fn list_range(
        &self,
        provider_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<AvailabilitySlot> {
        let rows = self.rows.read().await;
        let mut slots: Vec<AvailabilitySlot> = rows
            .values()
            .filter(|slot| {
                slot.provider_id == provider_id
                    && slot.start_time >= from
                    && slot.start_time < to
            })
            .cloned()
            .collect();
        slots.sort_by_key(|slot| slot.start_time);
        slots
    }
}

impl Default for SlotStore {
    fn default() -> Self {
        Self::new()
    }
}
