use super::codec::{decode_response, encode_request};
use async_trait::async_trait;
use ferrous_names_application::ports::RpcTransport;
use ferrous_names_domain::config::RpcConfig;
use ferrous_names_domain::{DomainError, RpcRequest, RpcResponse};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Builds the pooled rustls client shared by the RPC transport and the SNS
/// proxy adapter.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, DomainError> {
    reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(timeout)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| DomainError::Network(format!("failed to build HTTP client: {}", e)))
}

/// JSON-RPC 2.0 over HTTPS POST.
pub struct HttpRpcTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpRpcTransport {
    pub fn new(config: &RpcConfig) -> Result<Self, DomainError> {
        Ok(Self::with_client(build_http_client(config.timeout())?, config.url.clone()))
    }

    pub fn with_client(client: reqwest::Client, url: String) -> Self {
        Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl RpcTransport for HttpRpcTransport {
    async fn call(&self, request: &RpcRequest) -> Result<RpcResponse, DomainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(url = %self.url, id, request = %request, "Sending RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&encode_request(id, request))
            .send()
            .await
            .map_err(|e| {
                DomainError::from_upstream(
                    e.status().map(|s| s.as_u16()),
                    format!("RPC request to {} failed: {}", self.url, e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::from_upstream(
                Some(status.as_u16()),
                format!(
                    "RPC endpoint {} returned HTTP {}: {}",
                    self.url,
                    status.as_u16(),
                    body.trim()
                ),
            ));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DomainError::Decode(format!("invalid JSON-RPC body: {}", e)))?;

        decode_response(request, body)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
