use super::is_throttled;
use crate::names::cache::DomainCache;
use crate::names::rate_limiter::GlobalRateLimiter;
use crate::names::registry::LocalRegistry;
use dashmap::DashMap;
use ferrous_names_application::ports::NameService;
use ferrous_names_domain::config::ReverseConfig;
use ferrous_names_domain::{
    validate_wallet_address, BatchLookup, CacheLookup, CacheSource, DomainError, LookupFailure,
    LookupType, RequestPriority, ReverseDomainResult, ReverseSource,
};
use futures::future::join_all;
use rustc_hash::{FxBuildHasher, FxHashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

type InflightSender = Arc<watch::Sender<Option<Arc<ReverseDomainResult>>>>;

struct InflightLeaderGuard {
    inflight: Arc<DashMap<String, InflightSender, FxBuildHasher>>,
    key: String,
}

impl Drop for InflightLeaderGuard {
    fn drop(&mut self) {
        if let Some((_, tx)) = self.inflight.remove(&self.key) {
            let _ = tx.send(None);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmupReport {
    pub requested: usize,
    pub already_known: usize,
    pub resolved: usize,
    pub failed: usize,
}

/// Address to domain resolution.
///
/// Cascades registry, persistent cache and then a network lookup through the
/// shared rate limiter. Network outcomes, including "no domain", are cached.
/// Concurrent lookups of one address share a single network round trip.
pub struct ReverseDomainService {
    registry: Arc<LocalRegistry>,
    cache: Arc<DomainCache>,
    limiter: Arc<GlobalRateLimiter>,
    services: Vec<Arc<dyn NameService>>,
    enabled: bool,
    max_batch_size: usize,
    batch_delay: Duration,
    inflight: Arc<DashMap<String, InflightSender, FxBuildHasher>>,
}

impl ReverseDomainService {
    pub fn new(
        config: &ReverseConfig,
        registry: Arc<LocalRegistry>,
        cache: Arc<DomainCache>,
        limiter: Arc<GlobalRateLimiter>,
    ) -> Self {
        Self {
            registry,
            cache,
            limiter,
            services: Vec::new(),
            enabled: config.enabled,
            max_batch_size: config.max_batch_size.max(1),
            batch_delay: config.batch_delay(),
            inflight: Arc::new(DashMap::with_hasher(FxBuildHasher)),
        }
    }

    /// Services are queried in registration order; the first one reporting
    /// a domain wins.
    pub fn with_service(mut self, service: Arc<dyn NameService>) -> Self {
        self.services.push(service);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn get_domain(&self, address: &str) -> ReverseDomainResult {
        let address = address.trim();

        if !self.enabled {
            return ReverseDomainResult::truncated(
                address,
                LookupFailure::Disabled,
                DomainError::ReverseResolutionDisabled.to_string(),
            );
        }
        if let Err(e) = validate_wallet_address(address) {
            return ReverseDomainResult::truncated(
                address,
                LookupFailure::InvalidInput,
                e.to_string(),
            );
        }

        if let Some(domain) = self.registry.get_domain(address) {
            debug!(address = %address, domain = %domain, "Reverse lookup served by registry");
            return ReverseDomainResult::found(address, Some(domain), ReverseSource::Registry);
        }

        if let CacheLookup::Hit(domain) = self.cache.get(address, LookupType::Reverse).await {
            return ReverseDomainResult::found(address, domain, ReverseSource::Cache);
        }

        let (is_leader, rx) = self.register_or_join_inflight(address);
        if !is_leader {
            return self.resolve_as_follower(address, rx).await;
        }

        let _guard = InflightLeaderGuard {
            inflight: Arc::clone(&self.inflight),
            key: address.to_string(),
        };
        // A previous leader may have finished between the cache check and
        // registration.
        let result = match self.cached_answer(address).await {
            Some(cached) => cached,
            None => self.lookup_network(address).await,
        };

        if let Some((_, tx)) = self.inflight.remove(address) {
            let _ = tx.send(Some(Arc::new(result.clone())));
        }
        result
    }

    async fn cached_answer(&self, address: &str) -> Option<ReverseDomainResult> {
        if !self.cache.contains(address, LookupType::Reverse) {
            return None;
        }
        match self.cache.get(address, LookupType::Reverse).await {
            CacheLookup::Hit(domain) => {
                Some(ReverseDomainResult::found(address, domain, ReverseSource::Cache))
            }
            CacheLookup::Miss => None,
        }
    }

    fn register_or_join_inflight(
        &self,
        address: &str,
    ) -> (bool, watch::Receiver<Option<Arc<ReverseDomainResult>>>) {
        match self.inflight.entry(address.to_string()) {
            dashmap::Entry::Occupied(e) => {
                let rx = e.get().subscribe();
                drop(e);
                (false, rx)
            }
            dashmap::Entry::Vacant(e) => {
                let (tx, rx) = watch::channel(None::<Arc<ReverseDomainResult>>);
                e.insert(Arc::new(tx));
                (true, rx)
            }
        }
    }

    async fn resolve_as_follower(
        &self,
        address: &str,
        mut rx: watch::Receiver<Option<Arc<ReverseDomainResult>>>,
    ) -> ReverseDomainResult {
        if let Ok(()) = rx.changed().await {
            if let Some(result) = rx.borrow().clone() {
                return ReverseDomainResult::clone(&result);
            }
        }
        // Leader went away without a result; the limiter still dedups.
        self.lookup_network(address).await
    }

    async fn lookup_network(&self, address: &str) -> ReverseDomainResult {
        let mut domain = None;
        for service in &self.services {
            match self.domains_owned_by(Arc::clone(service), address).await {
                Ok(domains) => {
                    if let Some(first) = domains.into_iter().next() {
                        domain = Some(first);
                        break;
                    }
                }
                Err(e) if is_throttled(&e) => {
                    debug!(address = %address, error = %e, "Reverse lookup throttled");
                    return ReverseDomainResult::truncated(
                        address,
                        LookupFailure::RateLimited,
                        e.to_string(),
                    );
                }
                Err(e) => {
                    debug!(address = %address, error = %e, "Reverse lookup failed");
                    return ReverseDomainResult::truncated(
                        address,
                        LookupFailure::Network,
                        e.to_string(),
                    );
                }
            }
        }

        self.cache
            .set(address, domain.clone(), LookupType::Reverse, CacheSource::Api)
            .await;
        ReverseDomainResult::found(address, domain, ReverseSource::Api)
    }

    async fn domains_owned_by(
        &self,
        service: Arc<dyn NameService>,
        address: &str,
    ) -> Result<Vec<String>, DomainError> {
        let request_id = format!(
            "reverse:{}:{}",
            service.suffix().as_str().trim_start_matches('.'),
            address
        );
        let owner = address.to_string();
        self.limiter
            .enqueue(request_id, RequestPriority::Normal, move || {
                let service = Arc::clone(&service);
                let owner = owner.clone();
                async move { service.domains_owned_by(&owner).await }
            })
            .await
    }

    /// Resolves every distinct address in chunks of `max_batch_size`, each
    /// chunk concurrently, pausing `batch_delay` between chunks.
    pub async fn batch_get_domains<S: AsRef<str>>(&self, addresses: &[S]) -> BatchLookup {
        let distinct = dedup_addresses(addresses);
        let mut lookup = BatchLookup::default();

        for (index, chunk) in distinct.chunks(self.max_batch_size).enumerate() {
            if index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
            let results = join_all(chunk.iter().map(|a| self.get_domain(a))).await;
            for (address, result) in chunk.iter().zip(results) {
                lookup.summary.record(&result);
                lookup.results.insert(address.clone(), result);
            }
        }

        debug!(
            total = lookup.summary.total,
            from_registry = lookup.summary.from_registry,
            from_cache = lookup.summary.from_cache,
            from_api = lookup.summary.from_api,
            errors = lookup.summary.errors,
            rate_limited = lookup.summary.rate_limited,
            "Batch reverse lookup complete"
        );
        lookup
    }

    /// Resolves the addresses that neither the registry nor the cache can
    /// answer yet. Does not touch cache hit/miss statistics for the skipped.
    pub async fn warmup_cache<S: AsRef<str>>(&self, addresses: &[S]) -> WarmupReport {
        let distinct = dedup_addresses(addresses);
        let mut report = WarmupReport {
            requested: distinct.len(),
            ..Default::default()
        };

        let pending: Vec<String> = distinct
            .into_iter()
            .filter(|address| {
                let known = self.registry.get_domain(address).is_some()
                    || self.cache.contains(address, LookupType::Reverse);
                if known {
                    report.already_known += 1;
                }
                !known
            })
            .collect();

        if !pending.is_empty() {
            let lookup = self.batch_get_domains(&pending).await;
            report.resolved = lookup.summary.from_api + lookup.summary.from_cache;
            report.failed = lookup.summary.errors + lookup.summary.rate_limited;
        }

        info!(
            requested = report.requested,
            already_known = report.already_known,
            resolved = report.resolved,
            failed = report.failed,
            "Reverse cache warmup finished"
        );
        report
    }

    /// Drops the cached answer for `address` so the next lookup goes back
    /// to the network. Registry entries are unaffected.
    pub async fn invalidate(&self, address: &str) -> bool {
        self.cache.delete(address.trim(), LookupType::Reverse).await
    }
}

fn dedup_addresses<S: AsRef<str>>(addresses: &[S]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    addresses
        .iter()
        .map(|a| a.as_ref().trim().to_string())
        .filter(|a| seen.insert(a.clone()))
        .collect()
}
