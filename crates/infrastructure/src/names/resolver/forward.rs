use super::is_throttled;
use crate::names::cache::DomainCache;
use crate::names::rate_limiter::GlobalRateLimiter;
use crate::names::registry::LocalRegistry;
use ferrous_names_application::ports::NameService;
use ferrous_names_domain::config::ResolverConfig;
use ferrous_names_domain::{
    classify_input, CacheLookup, CacheSource, DomainError, DomainResolutionResult, DomainSuffix,
    InputKind, LookupType, RequestPriority, ResolutionKind,
};
use lru::LruCache;
use rustc_hash::FxHashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const NOT_FOUND: &str = "Domain not found";
const NETWORK_ERROR: &str = "Network error, please try again";

struct SessionEntry {
    result: DomainResolutionResult,
    stored_at: Instant,
}

/// Forward resolution: wallet address or `.sol` / `.skr` name to address.
///
/// Lookups consult, in order, a short-lived session cache keyed by the raw
/// input, the local registry, the persistent cache and finally the name
/// service for the suffix (through the shared rate limiter).
pub struct DomainResolver {
    services: FxHashMap<DomainSuffix, Arc<dyn NameService>>,
    registry: Arc<LocalRegistry>,
    cache: Arc<DomainCache>,
    limiter: Arc<GlobalRateLimiter>,
    session: Mutex<LruCache<String, SessionEntry>>,
    session_ttl: Duration,
}

impl DomainResolver {
    pub fn new(
        config: &ResolverConfig,
        registry: Arc<LocalRegistry>,
        cache: Arc<DomainCache>,
        limiter: Arc<GlobalRateLimiter>,
    ) -> Self {
        let capacity =
            NonZeroUsize::new(config.session_cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            services: FxHashMap::default(),
            registry,
            cache,
            limiter,
            session: Mutex::new(LruCache::new(capacity)),
            session_ttl: config.session_cache_ttl(),
        }
    }

    pub fn with_service(mut self, service: Arc<dyn NameService>) -> Self {
        self.services.insert(service.suffix(), service);
        self
    }

    pub fn supported_suffixes(&self) -> Vec<DomainSuffix> {
        DomainSuffix::ALL
            .into_iter()
            .filter(|s| self.services.contains_key(s))
            .collect()
    }

    /// Never fails: problems are reported in the result's `error`.
    pub async fn resolve_input(&self, input: &str) -> DomainResolutionResult {
        let key = input.trim().to_string();

        if let Some(cached) = self.session_get(&key) {
            debug!(input = %key, "Forward session cache HIT");
            return cached;
        }

        let (result, cacheable) = self.resolve_uncached(&key).await;
        if cacheable {
            self.session_put(key, result.clone());
        }
        result
    }

    async fn resolve_uncached(&self, input: &str) -> (DomainResolutionResult, bool) {
        let (name, suffix) = match classify_input(input) {
            Ok(InputKind::Wallet(address)) => {
                return (DomainResolutionResult::wallet(address), true)
            }
            Ok(InputKind::Domain { name, suffix }) => (name, suffix),
            Err(e) => {
                let kind = if input.contains('.') {
                    ResolutionKind::Domain
                } else {
                    ResolutionKind::Wallet
                };
                let domain = (kind == ResolutionKind::Domain).then(|| input.to_string());
                return (DomainResolutionResult::invalid(kind, domain, e.to_string()), true);
            }
        };

        if let Some(address) = self.registry.get_address(&name) {
            debug!(domain = %name, "Forward lookup served by registry");
            return (DomainResolutionResult::resolved(name, address), true);
        }

        match self.cache.get(&name, LookupType::Forward).await {
            CacheLookup::Hit(Some(address)) => {
                return (DomainResolutionResult::resolved(name, address), true)
            }
            CacheLookup::Hit(None) => return (not_found(name), true),
            CacheLookup::Miss => {}
        }

        let Some(service) = self.services.get(&suffix).map(Arc::clone) else {
            let error = DomainError::UnsupportedSuffix(suffix.to_string());
            let result = DomainResolutionResult::invalid(
                ResolutionKind::Domain,
                Some(name),
                error.to_string(),
            );
            return (result, true);
        };

        match self.lookup_owner(service, &name).await {
            Ok(Some(address)) => {
                self.cache
                    .set(&name, Some(address.clone()), LookupType::Forward, CacheSource::Api)
                    .await;
                (DomainResolutionResult::resolved(name, address), true)
            }
            Ok(None) => {
                self.cache
                    .set(&name, None, LookupType::Forward, CacheSource::Api)
                    .await;
                (not_found(name), true)
            }
            Err(e) if is_throttled(&e) || e.is_network() => {
                debug!(domain = %name, error = %e, "Forward lookup failed transiently");
                let result = DomainResolutionResult::invalid(
                    ResolutionKind::Domain,
                    Some(name),
                    NETWORK_ERROR,
                );
                (result, false)
            }
            Err(e) => {
                let error = format!("Failed to resolve {}: {}", name, e);
                (
                    DomainResolutionResult::invalid(ResolutionKind::Domain, Some(name), error),
                    false,
                )
            }
        }
    }

    async fn lookup_owner(
        &self,
        service: Arc<dyn NameService>,
        name: &str,
    ) -> Result<Option<String>, DomainError> {
        let domain = name.to_string();
        self.limiter
            .enqueue(format!("forward:{}", name), RequestPriority::High, move || {
                let service = Arc::clone(&service);
                let domain = domain.clone();
                async move { service.resolve_owner(&domain).await }
            })
            .await
    }

    fn session(&self) -> MutexGuard<'_, LruCache<String, SessionEntry>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn session_get(&self, key: &str) -> Option<DomainResolutionResult> {
        let mut session = self.session();
        let fresh = session
            .get(key)
            .map(|e| e.stored_at.elapsed() <= self.session_ttl)?;
        if fresh {
            session.get(key).map(|e| e.result.clone())
        } else {
            session.pop(key);
            None
        }
    }

    fn session_put(&self, key: String, result: DomainResolutionResult) {
        self.session().put(
            key,
            SessionEntry {
                result,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear_cache(&self) {
        self.session().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.session().len()
    }
}

fn not_found(name: String) -> DomainResolutionResult {
    DomainResolutionResult::invalid(ResolutionKind::Domain, Some(name), NOT_FOUND)
}
