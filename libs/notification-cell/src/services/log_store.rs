// libs/notification-cell/src/services/log_store.rs
use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{MessageType, NotificationLog, NotificationStatus};

/// Store of notification logs, keyed by event id so each consumed event
/// produces at most one row. `claim` is the atomic dedup gate: it checks
/// for an existing row and inserts the PENDING row under one write lock.
pub struct NotificationLogStore {
    rows: RwLock<HashMap<Uuid, NotificationLog>>,
}

impl NotificationLogStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Claim an event for processing. Returns `None` if the event was
    /// already claimed, otherwise the freshly inserted PENDING log.
    pub async fn claim(
        &self,
        event_id: Uuid,
        recipient_user_id: Uuid,
        message_type: MessageType,
        subject: String,
        body: String,
    ) -> Option<NotificationLog> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&event_id) {
            return None;
        }

        let log = NotificationLog {
            id: Uuid::new_v4(),
            event_id,
            recipient_user_id,
            message_type,
            subject,
            body,
            status: NotificationStatus::Pending,
            attempts: 0,
            created_at: Utc::now(),
            sent_at: None,
        };
        rows.insert(event_id, log.clone());
        Some(log)
    }

    pub async fn mark_sent(&self, event_id: Uuid) {
        let mut rows = self.rows.write().await;
        if let Some(log) = rows.get_mut(&event_id) {
            log.status = NotificationStatus::Sent;
            log.attempts += 1;
            log.sent_at = Some(Utc::now());
        }
    }

    pub async fn mark_failed(&self, event_id: Uuid) {
        let mut rows = self.rows.write().await;
        if let Some(log) = rows.get_mut(&event_id) {
            log.status = NotificationStatus::Failed;
            log.attempts += 1;
        }
    }

    /// Logs for one recipient, newest first.
    pub async fn list_for_user(&self, recipient_user_id: Uuid) -> Vec<NotificationLog> {
        let rows = self.rows.read().await;
        let mut logs: Vec<NotificationLog> = rows
            .values()
            .filter(|log| log.recipient_user_id == recipient_user_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        logs
    }
}

impl Default for NotificationLogStore {
    fn default() -> Self {
        Self::new()
    }
}
