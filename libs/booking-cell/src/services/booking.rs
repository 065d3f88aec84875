// libs/booking-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_models::events::{AppointmentCancelledEvent, AppointmentCreatedEvent};

use crate::models::{
    Appointment, AppointmentConfirmation, AppointmentStatus, BookingError, BookingRequest,
    CancellationConfirmation,
};
use crate::services::client::AvailabilityPort;
use crate::services::publisher::AppointmentEventPublisher;
use crate::services::repository::AppointmentRepository;

/// Drives the booking saga: local uniqueness check, remote slot reservation,
/// appointment persistence, compensating release on failure, and best-effort
/// event publication.
pub struct BookingService {
    repository: Arc<dyn AppointmentRepository>,
    availability: Arc<dyn AvailabilityPort>,
    publisher: Arc<AppointmentEventPublisher>,
}

impl BookingService {
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        availability: Arc<dyn AvailabilityPort>,
        publisher: Arc<AppointmentEventPublisher>,
    ) -> Self {
        Self {
            repository,
            availability,
            publisher,
        }
    }

    /// Book an appointment on a slot.
    ///
    /// The slot is reserved remotely before the appointment is persisted, so
    /// the only compensation ever needed is releasing a slot we know we
    /// reserved. A fresh reservation token is generated per booking attempt;
    /// retries inside this attempt reuse it, which makes the remote reserve
    /// replay-safe.
    pub async fn book_appointment(
        &self,
        request: BookingRequest,
    ) -> Result<AppointmentConfirmation, BookingError> {
        info!(
            "Booking appointment for patient {} with doctor {} on slot {}",
            request.patient_id, request.doctor_id, request.slot_id
        );

        // Step 1: local uniqueness. The repository re-checks on insert; this
        // early exit just avoids a pointless remote call.
        if self.repository.exists_active_for_slot(request.slot_id).await? {
            warn!("Slot {} is already booked locally", request.slot_id);
            return Err(BookingError::SlotNotAvailable(request.slot_id));
        }

        // Step 2: reserve remotely. Nothing to compensate if this fails -
        // the remote side never committed to us.
        let reservation_token = Uuid::new_v4().to_string();
        self.availability
            .reserve_slot(request.slot_id, &reservation_token)
            .await?;

        // Step 3: persist, compensating with a release if persistence fails.
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            slot_id: request.slot_id,
            appointment_date: request.appointment_date,
            start_time: request.start_time,
            status: AppointmentStatus::Confirmed,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        let appointment = match self.repository.insert(appointment).await {
            Ok(saved) => saved,
            Err(e) => {
                error!(
                    "Failed to save appointment for slot {}, attempting to release: {}",
                    request.slot_id, e
                );
                if let Err(release_err) = self.availability.release_slot(request.slot_id).await {
                    error!(
                        "Failed to release slot {} during compensation, manual reconciliation required: {}",
                        request.slot_id, release_err
                    );
                }
                return Err(BookingError::PersistenceFailed(e.to_string()));
            }
        };

        info!("Appointment created with ID: {}", appointment.id);

        // Step 4: best-effort event; a publish failure never reverses the
        // booking. No outbox - a dropped event is a known gap.
        self.publish_created_event(&appointment).await;

        Ok(AppointmentConfirmation::from_appointment(
            &appointment,
            "Appointment successfully booked",
        ))
    }

    /// Cancel an appointment: flip the status (one-way), then best-effort
    /// release of the remote slot and a best-effort cancelled event.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        reason: Option<String>,
    ) -> Result<CancellationConfirmation, BookingError> {
        info!("Cancelling appointment: {}", appointment_id);

        let mut appointment = self
            .repository
            .find_by_id(appointment_id)
            .await?
            .ok_or(BookingError::AppointmentNotFound(appointment_id))?;

        if !appointment.cancel() {
            return Err(BookingError::CancellationNotAllowed(appointment.status));
        }

        let appointment = self.repository.update(appointment).await?;

        // The appointment is already cancelled from the patient's
        // perspective; a failed release must not undo that.
        if let Err(e) = self.availability.release_slot(appointment.slot_id).await {
            error!(
                "Failed to release slot {} after cancellation, manual reconciliation required: {}",
                appointment.slot_id, e
            );
        }

        let cancelled_at = Utc::now();
        self.publish_cancelled_event(&appointment, cancelled_at, reason).await;

        Ok(CancellationConfirmation {
            appointment_id,
            status: AppointmentStatus::Cancelled,
            cancelled_at,
            message: "Appointment successfully cancelled".to_string(),
        })
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        debug!("Fetching appointment: {}", appointment_id);
        self.repository
            .find_by_id(appointment_id)
            .await?
            .ok_or(BookingError::AppointmentNotFound(appointment_id))
    }

    pub async fn list_patient_appointments(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, BookingError> {
        debug!("Fetching appointments for patient: {}", patient_id);
        self.repository.list_by_patient(patient_id).await
    }

    async fn publish_created_event(&self, appointment: &Appointment) {
        let event = AppointmentCreatedEvent {
            event_id: Uuid::new_v4(),
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            slot_id: appointment.slot_id,
            appointment_date: appointment.appointment_date,
            start_time: appointment.start_time,
            created_at: appointment.created_at,
        };

        if let Err(e) = self.publisher.publish_appointment_created(&event).await {
            error!(
                "Failed to publish AppointmentCreatedEvent for appointment {}: {}",
                appointment.id, e
            );
        }
    }

    async fn publish_cancelled_event(
        &self,
        appointment: &Appointment,
        cancelled_at: chrono::DateTime<Utc>,
        reason: Option<String>,
    ) {
        let event = AppointmentCancelledEvent {
            event_id: Uuid::new_v4(),
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            slot_id: appointment.slot_id,
            appointment_date: appointment.appointment_date,
            start_time: appointment.start_time,
            cancelled_at,
            reason,
        };

        if let Err(e) = self.publisher.publish_appointment_cancelled(&event).await {
            error!(
                "Failed to publish AppointmentCancelledEvent for appointment {}: {}",
                appointment.id, e
            );
        }
    }
}
