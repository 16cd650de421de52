use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Rate limited by upstream: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Request {id} abandoned after {attempts} rate-limited attempts")]
    RetriesExhausted { id: String, attempts: u32 },

    #[error("Name resolution temporarily disabled: circuit breaker open ({remaining_ms}ms remaining)")]
    CircuitOpen { remaining_ms: u64 },

    #[error("Request {0} rejected: queue cleared")]
    QueueCleared(String),

    #[error("Rate limiter is not running")]
    LimiterStopped,

    #[error("Request {0} was joined with a different result type")]
    ResultTypeMismatch(String),

    #[error("Reverse resolution disabled")]
    ReverseResolutionDisabled,

    #[error("Unsupported domain suffix: {0}")]
    UnsupportedSuffix(String),

    #[error("Registry error: {0}")]
    Registry(String),
}

const RATE_LIMIT_MARKERS: [&str; 2] = ["rate limit", "too many requests"];

impl DomainError {
    /// Builds the error for a failed upstream exchange, classifying throttling
    /// responses as `RateLimited` so the scheduler retries them.
    pub fn from_upstream(http_status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        if http_status == Some(429) || is_rate_limit_message(&message) {
            DomainError::RateLimited(message)
        } else {
            DomainError::Network(message)
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        match self {
            DomainError::RateLimited(_) => true,
            DomainError::Rpc { code, message } => *code == 429 || is_rate_limit_message(message),
            DomainError::Network(message) => is_rate_limit_message(message),
            _ => false,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(
            self,
            DomainError::Network(_) | DomainError::Rpc { .. } | DomainError::Decode(_)
        )
    }
}

pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m))
}
