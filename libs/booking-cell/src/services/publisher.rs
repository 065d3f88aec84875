use std::sync::Arc;

use tracing::debug;

use shared_config::AppConfig;
use shared_messaging::{EventBus, MessagingError};
use shared_models::events::{AppointmentCancelledEvent, AppointmentCreatedEvent};

/// Publishes appointment lifecycle events to the bus, one queue per event
/// type. Delivery is at-least-once; consumers dedup by eventId.
pub struct AppointmentEventPublisher {
    bus: Arc<dyn EventBus>,
    created_queue: String,
    cancelled_queue: String,
}

impl AppointmentEventPublisher {
    pub fn new(bus: Arc<dyn EventBus>, config: &AppConfig) -> Self {
        Self {
            bus,
            created_queue: config.appointment_created_queue.clone(),
            cancelled_queue: config.appointment_cancelled_queue.clone(),
        }
    }

    pub async fn publish_appointment_created(
        &self,
        event: &AppointmentCreatedEvent,
    ) -> Result<(), MessagingError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| MessagingError::QueueError(format!("Failed to serialize event: {}", e)))?;
        self.bus.publish(&self.created_queue, &payload).await?;
        debug!("Published AppointmentCreatedEvent eventId={}", event.event_id);
        Ok(())
    }

    pub async fn publish_appointment_cancelled(
        &self,
        event: &AppointmentCancelledEvent,
    ) -> Result<(), MessagingError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| MessagingError::QueueError(format!("Failed to serialize event: {}", e)))?;
        self.bus.publish(&self.cancelled_queue, &payload).await?;
        debug!("Published AppointmentCancelledEvent eventId={}", event.event_id);
        Ok(())
    }
}
