use async_trait::async_trait;
use ferrous_names_domain::{DomainError, DomainSuffix};

/// One name-service protocol (one per supported suffix).
#[async_trait]
pub trait NameService: Send + Sync {
    fn suffix(&self) -> DomainSuffix;

    /// Owner address of a fully qualified domain (`"toly.sol"`).
    /// `Ok(None)` when the name is not registered.
    async fn resolve_owner(&self, domain: &str) -> Result<Option<String>, DomainError>;

    /// Every fully qualified domain owned by `address`, in no particular
    /// order. Undecodable registry records are skipped.
    async fn domains_owned_by(&self, address: &str) -> Result<Vec<String>, DomainError>;
}
