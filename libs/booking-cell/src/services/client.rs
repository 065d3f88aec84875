// libs/booking-cell/src/services/client.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::json;
use tracing::{debug, error, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{BookingError, SlotReservation};
use crate::services::breaker::{CircuitBreaker, CircuitBreakerConfig};

/// Seam between the booking saga and the availability authority.
#[async_trait]
pub trait AvailabilityPort: Send + Sync {
    async fn reserve_slot(
        &self,
        slot_id: Uuid,
        reservation_token: &str,
    ) -> Result<SlotReservation, BookingError>;

    async fn release_slot(&self, slot_id: Uuid) -> Result<SlotReservation, BookingError>;
}

/// HTTP client for the availability service, composing per-attempt timeout,
/// bounded retry with fixed backoff, and a circuit breaker.
///
/// Only transient outcomes (network errors, timeouts, 5xx) are retried and
/// counted against the breaker; 404/409 are terminal semantic answers and
/// surface immediately as `SlotNotAvailable`.
pub struct RemoteAvailabilityClient {
    client: Client,
    base_url: String,
    max_attempts: u32,
    backoff: Duration,
    breaker: CircuitBreaker,
}

/// Per-attempt outcome, before retry/breaker policy is applied.
enum AttemptError {
    Terminal(BookingError),
    Transient(String),
}

impl RemoteAvailabilityClient {
    pub fn new(config: &AppConfig) -> Self {
        // Same failure semantics as reqwest::Client::new(): a client that
        // cannot be built is a startup defect, not a runtime condition.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.availability_service_url.trim_end_matches('/').to_string(),
            max_attempts: config.retry_max_attempts.max(1),
            backoff: Duration::from_millis(config.retry_backoff_ms),
            breaker: CircuitBreaker::new(CircuitBreakerConfig {
                failure_threshold: config.breaker_failure_threshold,
                recovery_timeout: Duration::from_secs(config.breaker_recovery_secs),
                success_threshold: config.breaker_success_threshold,
            }),
        }
    }

    async fn call(
        &self,
        slot_id: Uuid,
        action: &str,
        body: Option<serde_json::Value>,
    ) -> Result<SlotReservation, BookingError> {
        if !self.breaker.allow_request().await {
            warn!("Circuit open, short-circuiting {} for slot {}", action, slot_id);
            return Err(BookingError::DownstreamUnavailable(
                "availability service circuit is open".to_string(),
            ));
        }

        let url = format!("{}/{}/{}", self.base_url, slot_id, action);
        let mut last_transient = String::new();

        for attempt in 1..=self.max_attempts {
            match self.attempt(slot_id, &url, &body).await {
                Ok(reservation) => {
                    self.breaker.on_success().await;
                    return Ok(reservation);
                }
                Err(AttemptError::Terminal(err)) => {
                    // A definitive answer from the remote side; the breaker
                    // only tracks infrastructure health.
                    self.breaker.on_success().await;
                    return Err(err);
                }
                Err(AttemptError::Transient(reason)) => {
                    debug!(
                        "Transient failure calling {} (attempt {}/{}): {}",
                        url, attempt, self.max_attempts, reason
                    );
                    last_transient = reason;
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        self.breaker.on_failure().await;
        error!(
            "Availability service unreachable after {} attempts: {}",
            self.max_attempts, last_transient
        );
        Err(BookingError::DownstreamUnavailable(last_transient))
    }

    async fn attempt(
        &self,
        slot_id: Uuid,
        url: &str,
        body: &Option<serde_json::Value>,
    ) -> Result<SlotReservation, AttemptError> {
        let mut request = self.client.request(Method::PUT, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::Transient(format!("request timed out: {}", e))
            } else {
                AttemptError::Transient(format!("network error: {}", e))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<SlotReservation>()
                .await
                .map_err(|e| AttemptError::Transient(format!("invalid response body: {}", e)));
        }

        if status.is_server_error() {
            return Err(AttemptError::Transient(format!(
                "server error from availability service: {}",
                status
            )));
        }

        Err(AttemptError::Terminal(map_client_rejection(status, slot_id)))
    }
}

/// 4xx answers are terminal: "not found" is also "not bookable".
fn map_client_rejection(status: StatusCode, slot_id: Uuid) -> BookingError {
    match status {
        StatusCode::CONFLICT | StatusCode::NOT_FOUND => BookingError::SlotNotAvailable(slot_id),
        other => BookingError::DownstreamError(format!(
            "client error from availability service: {}",
            other
        )),
    }
}

#[async_trait]
impl AvailabilityPort for RemoteAvailabilityClient {
    async fn reserve_slot(
        &self,
        slot_id: Uuid,
        reservation_token: &str,
    ) -> Result<SlotReservation, BookingError> {
        debug!("Attempting to reserve slot {} in availability service", slot_id);
        self.call(
            slot_id,
            "reserve",
            Some(json!({ "reservationToken": reservation_token })),
        )
        .await
    }

    async fn release_slot(&self, slot_id: Uuid) -> Result<SlotReservation, BookingError> {
        debug!("Attempting to release slot {} in availability service", slot_id);
        self.call(slot_id, "release", None).await
    }
}
