use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Normal operation.
    Closed,
    /// Failing; calls are rejected until the recovery timeout elapses.
    Open,
    /// Probing whether the downstream recovered.
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u64,
    pub recovery_timeout: Duration,
    pub success_threshold: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

/// Call-wrapper state machine for a failing dependency.
///
/// Callers ask `allow_request` before dialing and report the outcome with
/// `on_success`/`on_failure`; only transient outcomes should be reported as
/// failures. Per-call timeouts are the caller's concern.
pub struct CircuitBreaker {
    state: RwLock<BreakerState>,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    last_failure_time: RwLock<Option<Instant>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: RwLock::new(BreakerState::Closed),
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            last_failure_time: RwLock::new(None),
            config,
        }
    }

    pub async fn allow_request(&self) -> bool {
        let state = *self.state.read().await;
        match state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let recovered = match *self.last_failure_time.read().await {
                    Some(last_failure) => last_failure.elapsed() >= self.config.recovery_timeout,
                    None => true,
                };
                if recovered {
                    *self.state.write().await = BreakerState::HalfOpen;
                    self.success_count.store(0, Ordering::SeqCst);
                    info!("Circuit breaker transitioning to HALF_OPEN");
                    true
                } else {
                    false
                }
            }
        }
    }

    pub async fn on_success(&self) {
        let state = *self.state.read().await;
        match state {
            BreakerState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    *self.state.write().await = BreakerState::Closed;
                    self.failure_count.store(0, Ordering::SeqCst);
                    self.success_count.store(0, Ordering::SeqCst);
                    info!("Circuit breaker reset to CLOSED state");
                }
            }
            _ => {
                self.failure_count.store(0, Ordering::SeqCst);
            }
        }
    }

    pub async fn on_failure(&self) {
        *self.last_failure_time.write().await = Some(Instant::now());

        let state = *self.state.read().await;
        if state == BreakerState::HalfOpen {
            // A probe failed; go straight back to rejecting calls.
            *self.state.write().await = BreakerState::Open;
            warn!("Circuit breaker re-opened after failed half-open probe");
            return;
        }

        let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;
        if failures >= self.config.failure_threshold {
            *self.state.write().await = BreakerState::Open;
            warn!("Circuit breaker opened after {} consecutive failures", failures);
        }
    }

    pub async fn state(&self) -> BreakerState {
        *self.state.read().await
    }
}
