mod forward;
mod reverse;

pub use forward::DomainResolver;
pub use reverse::{ReverseDomainService, WarmupReport};

use ferrous_names_domain::DomainError;

/// Failures caused by upstream throttling, including the scheduler giving
/// up on them or refusing work while its breaker is open.
pub(crate) fn is_throttled(error: &DomainError) -> bool {
    error.is_rate_limit()
        || matches!(
            error,
            DomainError::RetriesExhausted { .. } | DomainError::CircuitOpen { .. }
        )
}
