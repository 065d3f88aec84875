use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Appointment, BookingError};

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Persist a new appointment. Fails with `SlotNotAvailable` if another
    /// non-cancelled appointment already references the same slot; the check
    /// and the insert are atomic.
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, BookingError>;

    /// Optimistic update: fails with `ConcurrentModification` if the stored
    /// row's version no longer matches the incoming row's, so a stale copy
    /// cannot overwrite a concurrent transition.
    async fn update(&self, appointment: Appointment) -> Result<Appointment, BookingError>;

    async fn find_by_id(&self, appointment_id: Uuid) -> Result<Option<Appointment>, BookingError>;

    async fn exists_active_for_slot(&self, slot_id: Uuid) -> Result<bool, BookingError>;

    async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, BookingError>;
}

pub struct InMemoryAppointmentRepository {
    rows: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryAppointmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, BookingError> {
        let mut rows = self.rows.write().await;

        let slot_taken = rows
            .values()
            .any(|existing| existing.slot_id == appointment.slot_id && existing.status.is_active());
        if slot_taken {
            return Err(BookingError::SlotNotAvailable(appointment.slot_id));
        }

        rows.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, mut appointment: Appointment) -> Result<Appointment, BookingError> {
        let mut rows = self.rows.write().await;

        let current = rows
            .get(&appointment.id)
            .ok_or(BookingError::AppointmentNotFound(appointment.id))?;
        if current.version != appointment.version {
            return Err(BookingError::ConcurrentModification(appointment.id));
        }

        appointment.version += 1;
        appointment.updated_at = Utc::now();
        rows.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn find_by_id(&self, appointment_id: Uuid) -> Result<Option<Appointment>, BookingError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&appointment_id).cloned())
    }

    async fn exists_active_for_slot(&self, slot_id: Uuid) -> Result<bool, BookingError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .any(|appointment| appointment.slot_id == slot_id && appointment.status.is_active()))
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, BookingError> {
        let rows = self.rows.read().await;
        let mut appointments: Vec<Appointment> = rows
            .values()
            .filter(|appointment| appointment.patient_id == patient_id)
            .cloned()
            .collect();
        appointments.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(appointments)
    }
}
