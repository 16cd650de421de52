use super::layout::{collect_domains, RegistryLayout};
use async_trait::async_trait;
use ferrous_names_application::ports::{NameService, RpcTransport};
use ferrous_names_domain::domain_name::is_valid_wallet_address;
use ferrous_names_domain::{DomainError, DomainSuffix, RpcResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    s: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// `.sol` names: forward lookups through the SNS HTTP resolution proxy,
/// reverse lookups through an owner scan of the name service program.
pub struct SnsNameService {
    client: reqwest::Client,
    proxy_url: String,
    rpc: Arc<dyn RpcTransport>,
    layout: RegistryLayout,
}

impl SnsNameService {
    pub fn new(
        client: reqwest::Client,
        proxy_url: impl Into<String>,
        rpc: Arc<dyn RpcTransport>,
        program_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            proxy_url: proxy_url.into().trim_end_matches('/').to_string(),
            rpc,
            layout: RegistryLayout::sns(program_id),
        }
    }
}

#[async_trait]
impl NameService for SnsNameService {
    fn suffix(&self) -> DomainSuffix {
        DomainSuffix::Sol
    }

    async fn resolve_owner(&self, domain: &str) -> Result<Option<String>, DomainError> {
        let label = DomainSuffix::Sol.strip(domain);
        let url = format!("{}/resolve/{}", self.proxy_url, label);
        debug!(domain = %domain, url = %url, "Resolving via SNS proxy");

        let response = self.client.get(&url).send().await.map_err(|e| {
            DomainError::from_upstream(
                e.status().map(|s| s.as_u16()),
                format!("SNS proxy request failed: {}", e),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::from_upstream(
                Some(status.as_u16()),
                format!("SNS proxy returned HTTP {}", status.as_u16()),
            ));
        }

        let body: ProxyResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Decode(format!("invalid SNS proxy body: {}", e)))?;

        match (body.s.as_str(), body.result) {
            ("ok", serde_json::Value::String(owner)) if is_valid_wallet_address(&owner) => {
                Ok(Some(owner))
            }
            ("ok", other) => Err(DomainError::Decode(format!(
                "SNS proxy returned an unexpected owner: {}",
                other
            ))),
            (_, serde_json::Value::String(message)) => classify_proxy_error(message),
            (_, other) => classify_proxy_error(other.to_string()),
        }
    }

    async fn domains_owned_by(&self, address: &str) -> Result<Vec<String>, DomainError> {
        match self.rpc.call(&self.layout.owner_scan(address)).await? {
            RpcResponse::ProgramAccounts(accounts) => {
                Ok(collect_domains(&accounts, DomainSuffix::Sol))
            }
            other => Err(DomainError::Decode(format!(
                "unexpected response to owner scan: {:?}",
                other
            ))),
        }
    }
}

fn classify_proxy_error(message: String) -> Result<Option<String>, DomainError> {
    let lower = message.to_ascii_lowercase();
    if lower.contains("not found") || lower.contains("invalid") || lower.contains("does not exist")
    {
        return Ok(None);
    }
    Err(DomainError::from_upstream(None, message))
}
