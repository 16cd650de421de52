use super::layout::{collect_domains, decode_owner, RegistryLayout};
use async_trait::async_trait;
use ferrous_names_application::ports::{NameService, RpcTransport};
use ferrous_names_domain::{DomainError, DomainSuffix, KeyedAccount, RpcRequest, RpcResponse};
use std::sync::Arc;
use tracing::debug;

/// `.skr` names, resolved entirely over JSON-RPC account scans of the ANS
/// registry program.
pub struct AnsNameService {
    rpc: Arc<dyn RpcTransport>,
    layout: RegistryLayout,
}

impl AnsNameService {
    pub fn new(rpc: Arc<dyn RpcTransport>, program_id: impl Into<String>) -> Self {
        Self {
            rpc,
            layout: RegistryLayout::ans(program_id),
        }
    }

    async fn scan(&self, request: RpcRequest) -> Result<Vec<KeyedAccount>, DomainError> {
        match self.rpc.call(&request).await? {
            RpcResponse::ProgramAccounts(accounts) => Ok(accounts),
            other => Err(DomainError::Decode(format!(
                "unexpected response to {}: {:?}",
                request.method(),
                other
            ))),
        }
    }
}

#[async_trait]
impl NameService for AnsNameService {
    fn suffix(&self) -> DomainSuffix {
        DomainSuffix::Skr
    }

    async fn resolve_owner(&self, domain: &str) -> Result<Option<String>, DomainError> {
        let label = DomainSuffix::Skr.strip(domain);
        let accounts = self.scan(self.layout.name_scan(label)).await?;
        debug!(domain = %domain, matches = accounts.len(), "ANS name scan");

        Ok(accounts
            .iter()
            .find_map(|account| decode_owner(&account.data)))
    }

    async fn domains_owned_by(&self, address: &str) -> Result<Vec<String>, DomainError> {
        let accounts = self.scan(self.layout.owner_scan(address)).await?;
        Ok(collect_domains(&accounts, DomainSuffix::Skr))
    }
}
