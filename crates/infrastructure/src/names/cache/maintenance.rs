use super::store::DomainCache;
use async_trait::async_trait;
use ferrous_names_application::ports::{CacheCleanupOutcome, CacheMaintenancePort};
use ferrous_names_domain::DomainError;
use std::sync::Arc;

/// Infrastructure adapter implementing `CacheMaintenancePort`.
pub struct NameCacheMaintenance {
    cache: Arc<DomainCache>,
}

impl NameCacheMaintenance {
    pub fn new(cache: Arc<DomainCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl CacheMaintenancePort for NameCacheMaintenance {
    async fn run_cleanup_cycle(&self) -> Result<CacheCleanupOutcome, DomainError> {
        Ok(self.cache.cleanup().await)
    }
}
