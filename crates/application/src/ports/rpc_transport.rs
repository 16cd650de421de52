use async_trait::async_trait;
use ferrous_names_domain::{DomainError, RpcRequest, RpcResponse};

/// Sends one JSON-RPC request upstream.
///
/// Throttling responses (HTTP 429, "rate limit", "too many requests") must be
/// reported as `DomainError::RateLimited`; every other failure is
/// non-retryable.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, request: &RpcRequest) -> Result<RpcResponse, DomainError>;

    fn endpoint(&self) -> &str;
}
