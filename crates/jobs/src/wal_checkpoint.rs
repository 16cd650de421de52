use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Periodic PASSIVE checkpoint of the name cache database.
pub struct WalCheckpointJob {
    pool: SqlitePool,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl WalCheckpointJob {
    pub fn new(pool: SqlitePool, interval_secs: u64) -> Self {
        Self {
            pool,
            interval_secs,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.interval_secs,
            "Starting name cache WAL checkpoint job"
        );

        tokio::spawn(async move {
            let period = Duration::from_secs(self.interval_secs.max(1));
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("WalCheckpointJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match sqlx::query("PRAGMA wal_checkpoint(PASSIVE)")
                            .execute(&self.pool)
                            .await
                        {
                            Ok(_) => {
                                debug!("Name cache WAL checkpoint completed");
                            }
                            Err(e) => {
                                error!(error = %e, "WAL checkpoint failed");
                            }
                        }
                    }
                }
            }
        });
    }
}
