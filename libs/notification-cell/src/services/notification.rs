// libs/notification-cell/src/services/notification.rs
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_models::events::{AppointmentCancelledEvent, AppointmentCreatedEvent};

use crate::models::{MessageType, NotificationError, NotificationLog};
use crate::services::log_store::NotificationLogStore;

/// Delivery channel for outgoing notifications.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, log: &NotificationLog) -> Result<(), NotificationError>;
}

/// Stand-in delivery channel: logs the message instead of sending it.
pub struct SimulatedSender;

#[async_trait]
impl NotificationSender for SimulatedSender {
    async fn send(&self, log: &NotificationLog) -> Result<(), NotificationError> {
        info!(
            "Delivering {} to user {}: {}",
            log.message_type, log.recipient_user_id, log.subject
        );
        Ok(())
    }
}

/// Consumes appointment events at-least-once and turns each distinct event
/// into exactly one notification. Dedup happens before delivery: the event
/// is claimed in the log store first, so a redelivered event finds the
/// existing row and is dropped.
pub struct NotificationService {
    store: Arc<NotificationLogStore>,
    sender: Arc<dyn NotificationSender>,
}

impl NotificationService {
    pub fn new(store: Arc<NotificationLogStore>, sender: Arc<dyn NotificationSender>) -> Self {
        Self { store, sender }
    }

    pub async fn handle_appointment_created(
        &self,
        event: &AppointmentCreatedEvent,
    ) -> Result<(), NotificationError> {
        let subject = "Your appointment is confirmed".to_string();
        let body = format!(
            "Your appointment on {} at {} has been booked.",
            event.appointment_date,
            event.start_time.format("%H:%M %Z")
        );
        self.process(
            event.event_id,
            event.patient_id,
            MessageType::BookingConfirmation,
            subject,
            body,
        )
        .await
    }

    pub async fn handle_appointment_cancelled(
        &self,
        event: &AppointmentCancelledEvent,
    ) -> Result<(), NotificationError> {
        let subject = "Your appointment was cancelled".to_string();
        let body = match &event.reason {
            Some(reason) => format!(
                "Your appointment on {} has been cancelled: {}",
                event.appointment_date, reason
            ),
            None => format!(
                "Your appointment on {} has been cancelled.",
                event.appointment_date
            ),
        };
        self.process(
            event.event_id,
            event.patient_id,
            MessageType::CancellationNotice,
            subject,
            body,
        )
        .await
    }

    pub async fn list_user_notifications(&self, user_id: Uuid) -> Vec<NotificationLog> {
        self.store.list_for_user(user_id).await
    }

    async fn process(
        &self,
        event_id: Uuid,
        recipient_user_id: Uuid,
        message_type: MessageType,
        subject: String,
        body: String,
    ) -> Result<(), NotificationError> {
        let Some(log) = self
            .store
            .claim(event_id, recipient_user_id, message_type, subject, body)
            .await
        else {
            // Redelivery under at-least-once semantics, not an error worth
            // failing the consumer over.
            debug!("Event {} already processed, skipping", event_id);
            return Ok(());
        };

        match self.sender.send(&log).await {
            Ok(()) => {
                self.store.mark_sent(event_id).await;
                info!(
                    "Notification {} sent for event {} to user {}",
                    log.id, event_id, recipient_user_id
                );
                Ok(())
            }
            Err(e) => {
                self.store.mark_failed(event_id).await;
                error!("Notification for event {} failed: {}", event_id, e);
                Err(e)
            }
        }
    }
}
