use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Point-in-time view of the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerState {
    pub consecutive_failures: u32,
    pub is_open: bool,
    pub opened_at: Option<Instant>,
}

/// Counts consecutive rate-limit failures. At `threshold` it opens and stays
/// open for `cooldown`, then closes on its own with the counter reset.
///
/// Not internally synchronized: the limiter keeps it inside its state lock so
/// every transition happens in one critical section.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    cooldown: Duration,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            cooldown,
            consecutive_failures: 0,
            opened_at: None,
        }
    }

    /// Returns `true` when this failure tripped the breaker.
    pub fn record_failure(&mut self, now: Instant) -> bool {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.opened_at.is_none() && self.consecutive_failures >= self.threshold {
            self.opened_at = Some(now);
            warn!(
                threshold = self.threshold,
                cooldown_ms = self.cooldown.as_millis() as u64,
                "Circuit breaker OPEN: pausing upstream requests"
            );
            return true;
        }
        false
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Closes the breaker if the cooldown has elapsed and reports whether it
    /// is still open.
    pub fn is_open(&mut self, now: Instant) -> bool {
        self.remaining_cooldown(now).is_some()
    }

    pub fn remaining_cooldown(&mut self, now: Instant) -> Option<Duration> {
        let opened_at = self.opened_at?;
        let closes_at = opened_at + self.cooldown;
        if now >= closes_at {
            self.opened_at = None;
            self.consecutive_failures = 0;
            info!("Circuit breaker CLOSED: resuming upstream requests");
            return None;
        }
        Some(closes_at - now)
    }

    pub fn state(&self) -> CircuitBreakerState {
        CircuitBreakerState {
            consecutive_failures: self.consecutive_failures,
            is_open: self.opened_at.is_some(),
            opened_at: self.opened_at,
        }
    }
}
