use async_trait::async_trait;
use ferrous_names_application::ports::{CacheCleanupOutcome, CacheMaintenancePort};
use ferrous_names_domain::DomainError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub struct MockCacheMaintenancePort {
    cleanup_calls: AtomicU64,
    should_fail: AtomicBool,
}

impl MockCacheMaintenancePort {
    pub fn new() -> Self {
        Self {
            cleanup_calls: AtomicU64::new(0),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn cleanup_call_count(&self) -> u64 {
        self.cleanup_calls.load(Ordering::SeqCst)
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheMaintenancePort for MockCacheMaintenancePort {
    async fn run_cleanup_cycle(&self) -> Result<CacheCleanupOutcome, DomainError> {
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::StorageUnavailable("mock failure".into()));
        }
        Ok(CacheCleanupOutcome {
            expired_removed: 2,
            evicted: 1,
            cache_size: 10,
        })
    }
}
