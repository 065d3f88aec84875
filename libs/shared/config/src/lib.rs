use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_port: u16,
    pub availability_service_url: String,
    pub redis_url: Option<String>,
    pub http_timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub breaker_failure_threshold: u64,
    pub breaker_recovery_secs: u64,
    pub breaker_success_threshold: u64,
    pub appointment_created_queue: String,
    pub appointment_cancelled_queue: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_port: parse_env("PORT", 3000),
            availability_service_url: env::var("AVAILABILITY_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("AVAILABILITY_SERVICE_URL not set, using local default");
                    "http://localhost:3000/api/v1/availability".to_string()
                }),
            redis_url: env::var("REDIS_URL").ok(),
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", 5),
            retry_max_attempts: parse_env("RETRY_MAX_ATTEMPTS", 3),
            retry_backoff_ms: parse_env("RETRY_BACKOFF_MS", 200),
            breaker_failure_threshold: parse_env("BREAKER_FAILURE_THRESHOLD", 5),
            breaker_recovery_secs: parse_env("BREAKER_RECOVERY_SECS", 30),
            breaker_success_threshold: parse_env("BREAKER_SUCCESS_THRESHOLD", 2),
            appointment_created_queue: env::var("APPOINTMENT_CREATED_QUEUE")
                .unwrap_or_else(|_| "appointment-created".to_string()),
            appointment_cancelled_queue: env::var("APPOINTMENT_CANCELLED_QUEUE")
                .unwrap_or_else(|_| "appointment-cancelled".to_string()),
        }
    }

}

fn parse_env<T: std::str::FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value, using default {}", name, default);
            default
        }),
        Err(_) => default,
    }
}
