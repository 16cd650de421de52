use async_trait::async_trait;
use ferrous_names_domain::DomainError;

/// Outcome of a cache cleanup cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheCleanupOutcome {
    pub expired_removed: usize,
    pub evicted: usize,
    pub cache_size: usize,
}

impl CacheCleanupOutcome {
    pub fn entries_removed(&self) -> usize {
        self.expired_removed + self.evicted
    }
}

/// Port for periodic name cache maintenance.
#[async_trait]
pub trait CacheMaintenancePort: Send + Sync {
    /// Purge expired entries, then evict the oldest until under capacity.
    async fn run_cleanup_cycle(&self) -> Result<CacheCleanupOutcome, DomainError>;
}
