mod backoff;
mod circuit_breaker;
mod limiter;
mod queue;

pub use backoff::BackoffPolicy;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerState};
pub use limiter::{GlobalRateLimiter, RateLimiterStats};
pub use queue::{Operation, Payload};
