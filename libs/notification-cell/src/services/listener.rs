// libs/notification-cell/src/services/listener.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use serde::de::DeserializeOwned;

use shared_config::AppConfig;
use shared_messaging::EventBus;
use shared_models::events::{AppointmentCancelledEvent, AppointmentCreatedEvent};

use crate::models::NotificationError;
use crate::services::notification::NotificationService;

const POP_WAIT: Duration = Duration::from_millis(500);

/// Queue consumer driving the notification service. Polls the created and
/// cancelled queues in turn; a malformed payload or a failed delivery is
/// logged and the loop moves on, the queue itself is never poisoned.
pub struct NotificationListener {
    bus: Arc<dyn EventBus>,
    service: Arc<NotificationService>,
    created_queue: String,
    cancelled_queue: String,
    is_shutdown: RwLock<bool>,
}

impl NotificationListener {
    pub fn new(
        bus: Arc<dyn EventBus>,
        service: Arc<NotificationService>,
        config: &AppConfig,
    ) -> Self {
        Self {
            bus,
            service,
            created_queue: config.appointment_created_queue.clone(),
            cancelled_queue: config.appointment_cancelled_queue.clone(),
            is_shutdown: RwLock::new(false),
        }
    }

    pub async fn start(&self) {
        info!(
            "Notification listener started on queues '{}' and '{}'",
            self.created_queue, self.cancelled_queue
        );

        loop {
            if *self.is_shutdown.read().await {
                debug!("Notification listener received shutdown signal");
                break;
            }

            self.drain_created().await;
            self.drain_cancelled().await;
        }

        info!("Notification listener stopped");
    }

    pub async fn shutdown(&self) {
        *self.is_shutdown.write().await = true;
    }

    async fn drain_created(&self) {
        match self.bus.pop(&self.created_queue, POP_WAIT).await {
            Ok(Some(payload)) => match parse_event::<AppointmentCreatedEvent>(&payload) {
                Ok(event) => {
                    if let Err(e) = self.service.handle_appointment_created(&event).await {
                        error!("Failed to process created event {}: {}", event.event_id, e);
                    }
                }
                Err(e) => error!("Dropping created event: {}", e),
            },
            Ok(None) => {}
            Err(e) => {
                error!("Failed to pop from '{}': {}", self.created_queue, e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    async fn drain_cancelled(&self) {
        match self.bus.pop(&self.cancelled_queue, POP_WAIT).await {
            Ok(Some(payload)) => match parse_event::<AppointmentCancelledEvent>(&payload) {
                Ok(event) => {
                    if let Err(e) = self.service.handle_appointment_cancelled(&event).await {
                        error!("Failed to process cancelled event {}: {}", event.event_id, e);
                    }
                }
                Err(e) => error!("Dropping cancelled event: {}", e),
            },
            Ok(None) => {}
            Err(e) => {
                error!("Failed to pop from '{}': {}", self.cancelled_queue, e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

fn parse_event<E: DeserializeOwned>(payload: &str) -> Result<E, NotificationError> {
    serde_json::from_str(payload).map_err(|e| NotificationError::MalformedEvent(e.to_string()))
}
