use ferrous_names_application::ports::CacheMaintenancePort;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 3600;

/// Periodically purges expired name cache entries and trims the cache back
/// under capacity.
pub struct CacheMaintenanceJob {
    maintenance: Arc<dyn CacheMaintenancePort>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl CacheMaintenanceJob {
    pub fn new(maintenance: Arc<dyn CacheMaintenancePort>) -> Self {
        Self {
            maintenance,
            interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.interval_secs,
            "Starting name cache maintenance job"
        );

        tokio::spawn(async move {
            let period = Duration::from_secs(self.interval_secs);
            // The first tick of `interval` fires immediately; startup already
            // hydrated and trimmed the cache.
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("CacheMaintenanceJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.maintenance.run_cleanup_cycle().await {
                            Ok(outcome) => {
                                if outcome.entries_removed() > 0 {
                                    info!(
                                        expired_removed = outcome.expired_removed,
                                        evicted = outcome.evicted,
                                        cache_size = outcome.cache_size,
                                        "Name cache cleanup completed"
                                    );
                                }
                            }
                            Err(e) => {
                                error!(error = %e, "Name cache cleanup failed");
                            }
                        }
                    }
                }
            }
        });
    }
}
