use crate::bootstrap;
use ferrous_names_application::ports::{NameService, RpcTransport};
use ferrous_names_domain::Config;
use ferrous_names_infrastructure::names::cache::{DomainCache, NameCacheMaintenance};
use ferrous_names_infrastructure::names::rate_limiter::GlobalRateLimiter;
use ferrous_names_infrastructure::names::registry::LocalRegistry;
use ferrous_names_infrastructure::names::resolver::{DomainResolver, ReverseDomainService};
use ferrous_names_infrastructure::names::services::{AnsNameService, SnsNameService};
use ferrous_names_infrastructure::names::transport::{build_http_client, HttpRpcTransport};
use ferrous_names_jobs::{CacheMaintenanceJob, JobRunner, WalCheckpointJob};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const WAL_CHECKPOINT_INTERVAL_SECS: u64 = 300;

/// Everything a command needs, wired from one [`Config`].
pub struct NameServices {
    pub registry: Arc<LocalRegistry>,
    pub cache: Arc<DomainCache>,
    pub limiter: Arc<GlobalRateLimiter>,
    pub resolver: DomainResolver,
    pub reverse: ReverseDomainService,
    pool: Option<SqlitePool>,
    shutdown: CancellationToken,
}

impl NameServices {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let shutdown = CancellationToken::new();

        let (store, pool) = bootstrap::init_store(&config.database).await;
        let cache = Arc::new(DomainCache::new(&config.cache, store));
        let hydrated = cache.init().await;

        let http = build_http_client(config.rpc.timeout())?;
        let registry = Arc::new(LocalRegistry::from_config(&config.registry));
        if let Some(url) = &config.registry.remote_url {
            if let Err(e) = registry.load_remote(&http, url).await {
                warn!(
                    url = %url,
                    error = %e,
                    "Remote registry unavailable, continuing with local entries"
                );
            }
        }

        let limiter = Arc::new(GlobalRateLimiter::with_shutdown(
            &config.rate_limit,
            shutdown.clone(),
        ));
        limiter.start();

        let rpc: Arc<dyn RpcTransport> =
            Arc::new(HttpRpcTransport::with_client(http.clone(), config.rpc.url.clone()));
        let sns: Arc<dyn NameService> = Arc::new(SnsNameService::new(
            http,
            config.resolver.sns_proxy_url.clone(),
            Arc::clone(&rpc),
            config.rpc.sns_program_id.clone(),
        ));
        let ans: Arc<dyn NameService> = Arc::new(AnsNameService::new(
            rpc,
            config.rpc.ans_program_id.clone(),
        ));

        let resolver = DomainResolver::new(
            &config.resolver,
            Arc::clone(&registry),
            Arc::clone(&cache),
            Arc::clone(&limiter),
        )
        .with_service(Arc::clone(&sns))
        .with_service(Arc::clone(&ans));

        let reverse = ReverseDomainService::new(
            &config.reverse,
            Arc::clone(&registry),
            Arc::clone(&cache),
            Arc::clone(&limiter),
        )
        .with_service(sns)
        .with_service(ans);

        info!(
            registry_entries = registry.len(),
            cached_entries = hydrated,
            durable = cache.is_durable(),
            rpc = %config.rpc.url,
            "Name services ready"
        );

        Ok(Self {
            registry,
            cache,
            limiter,
            resolver,
            reverse,
            pool,
            shutdown,
        })
    }

    /// Periodic cache cleanup, plus WAL checkpoints when a database is open.
    pub async fn start_jobs(&self, config: &Config) -> usize {
        let maintenance = Arc::new(NameCacheMaintenance::new(Arc::clone(&self.cache)));
        let cleanup = CacheMaintenanceJob::new(maintenance)
            .with_interval(config.cache.cleanup_interval_secs);
        let mut runner = JobRunner::new()
            .with_cache_maintenance(cleanup)
            .with_shutdown_token(self.shutdown.clone());
        if let Some(pool) = &self.pool {
            runner = runner.with_wal_checkpoint(WalCheckpointJob::new(
                pool.clone(),
                WAL_CHECKPOINT_INTERVAL_SECS,
            ));
        }
        runner.start().await
    }

    pub async fn shutdown(self) {
        self.shutdown.cancel();
        self.limiter.dispose();
        if let Some(pool) = self.pool {
            pool.close().await;
        }
        info!("Name services stopped");
    }
}
