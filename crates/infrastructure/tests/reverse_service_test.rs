use ferrous_names_domain::config::{RateLimitConfig, RegistryConfig, ReverseConfig};
use ferrous_names_domain::{
    CacheLookup, CacheSource, DomainSuffix, LookupFailure, LookupType, RegistryEntry,
    RegistryPriority, RegistrySource, ReverseSource,
};
use ferrous_names_infrastructure::names::cache::DomainCache;
use ferrous_names_infrastructure::names::rate_limiter::GlobalRateLimiter;
use ferrous_names_infrastructure::names::registry::LocalRegistry;
use ferrous_names_infrastructure::names::resolver::ReverseDomainService;
use futures::future::join_all;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

mod helpers;
use helpers::{
    address, cache_config, fast_rate_limit, reverse_config, MockDurableStore, MockNameService,
    ServiceBehavior, TOLY_ADDRESS,
};

struct Fixture {
    service: Arc<ReverseDomainService>,
    sol: Arc<MockNameService>,
    skr: Arc<MockNameService>,
    cache: Arc<DomainCache>,
    registry: Arc<LocalRegistry>,
    limiter: Arc<GlobalRateLimiter>,
}

fn fixture_with(
    reverse: ReverseConfig,
    rate_limit: RateLimitConfig,
    sol: MockNameService,
    skr: MockNameService,
) -> Fixture {
    let registry = Arc::new(LocalRegistry::from_config(&RegistryConfig::default()));
    let cache = Arc::new(DomainCache::new(
        &cache_config(1_000),
        Arc::new(MockDurableStore::new()),
    ));
    let limiter = Arc::new(GlobalRateLimiter::new(&rate_limit));
    let sol = Arc::new(sol);
    let skr = Arc::new(skr);

    let service = ReverseDomainService::new(
        &reverse,
        Arc::clone(&registry),
        Arc::clone(&cache),
        Arc::clone(&limiter),
    )
    .with_service(sol.clone())
    .with_service(skr.clone());

    Fixture {
        service: Arc::new(service),
        sol,
        skr,
        cache,
        registry,
        limiter,
    }
}

fn fixture() -> Fixture {
    fixture_with(
        reverse_config(10),
        fast_rate_limit(),
        MockNameService::new(DomainSuffix::Sol).with_domain("alice.sol", &address(1)),
        MockNameService::new(DomainSuffix::Skr).with_domain("bob.skr", &address(2)),
    )
}

fn network_calls(f: &Fixture) -> usize {
    f.sol.total_calls() + f.skr.total_calls()
}

// ── cascade ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_builtin_registry_entry_needs_no_network() {
    let f = fixture();

    let result = f.service.get_domain(TOLY_ADDRESS).await;

    assert_eq!(result.domain.as_deref(), Some("toly.sol"));
    assert_eq!(result.source, ReverseSource::Registry);
    assert_eq!(network_calls(&f), 0);
    assert_eq!(f.limiter.stats().total_requests, 0);
}

#[tokio::test(start_paused = true)]
async fn test_registry_beats_cache() {
    let f = fixture();
    let owner = address(9);
    f.cache
        .set(&owner, Some("cached.sol".into()), LookupType::Reverse, CacheSource::Api)
        .await;
    f.registry
        .add_entry(RegistryEntry::new(
            owner.clone(),
            "registered.sol",
            RegistrySource::Manual,
            RegistryPriority::Medium,
        ))
        .unwrap();

    let result = f.service.get_domain(&owner).await;

    assert_eq!(result.domain.as_deref(), Some("registered.sol"));
    assert_eq!(result.source, ReverseSource::Registry);
}

#[tokio::test(start_paused = true)]
async fn test_cache_hit_needs_no_network() {
    let f = fixture();
    let owner = address(7);
    f.cache
        .set(&owner, Some("cached.sol".into()), LookupType::Reverse, CacheSource::Api)
        .await;

    let result = f.service.get_domain(&owner).await;

    assert_eq!(result.domain.as_deref(), Some("cached.sol"));
    assert_eq!(result.source, ReverseSource::Cache);
    assert_eq!(network_calls(&f), 0);
}

#[tokio::test(start_paused = true)]
async fn test_network_result_is_cached() {
    let f = fixture();

    let first = f.service.get_domain(&address(1)).await;
    assert_eq!(first.domain.as_deref(), Some("alice.sol"));
    assert_eq!(first.source, ReverseSource::Api);
    assert_eq!(f.sol.reverse_calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.skr.reverse_calls.load(Ordering::SeqCst), 0);

    let second = f.service.get_domain(&address(1)).await;
    assert_eq!(second.source, ReverseSource::Cache);
    assert_eq!(second.domain.as_deref(), Some("alice.sol"));
    assert_eq!(network_calls(&f), 1);
}

#[tokio::test(start_paused = true)]
async fn test_second_suffix_is_tried_when_first_has_nothing() {
    let f = fixture();

    let result = f.service.get_domain(&address(2)).await;

    assert_eq!(result.domain.as_deref(), Some("bob.skr"));
    assert_eq!(f.sol.reverse_calls.load(Ordering::SeqCst), 1);
    assert_eq!(f.skr.reverse_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_absence_is_cached() {
    let f = fixture();
    let nobody = address(42);

    let first = f.service.get_domain(&nobody).await;
    assert_eq!(first.domain, None);
    assert_eq!(first.source, ReverseSource::Api);
    assert_eq!(first.error, None);
    assert_eq!(
        f.cache.get(&nobody, LookupType::Reverse).await,
        CacheLookup::Hit(None)
    );

    let calls = network_calls(&f);
    let second = f.service.get_domain(&nobody).await;
    assert_eq!(second.source, ReverseSource::Cache);
    assert_eq!(second.domain, None);
    assert_eq!(network_calls(&f), calls);
}

#[tokio::test(start_paused = true)]
async fn test_invalidate_forces_network_again() {
    let f = fixture();
    f.service.get_domain(&address(1)).await;

    assert!(f.service.invalidate(&address(1)).await);
    let result = f.service.get_domain(&address(1)).await;

    assert_eq!(result.source, ReverseSource::Api);
    assert_eq!(f.sol.reverse_calls.load(Ordering::SeqCst), 2);
}

// ── failures ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_persistent_rate_limiting_degrades_to_truncated() {
    let f = fixture();
    f.sol.set_behavior(ServiceBehavior::RateLimited);

    let result = f.service.get_domain(&address(1)).await;

    assert_eq!(result.source, ReverseSource::Truncated);
    assert_eq!(result.failure, Some(LookupFailure::RateLimited));
    assert!(result.error.is_some());
    assert!(!result.is_loading);
    assert_eq!(result.display_name().len(), 11);
    // 1 attempt + max_retries
    assert_eq!(f.sol.reverse_calls.load(Ordering::SeqCst), 4);
    assert!(f.cache.get(&address(1), LookupType::Reverse).await.is_miss());
}

#[tokio::test(start_paused = true)]
async fn test_network_error_is_not_cached() {
    let f = fixture();
    f.sol.set_behavior(ServiceBehavior::NetworkError);

    let result = f.service.get_domain(&address(1)).await;
    assert_eq!(result.failure, Some(LookupFailure::Network));
    assert_eq!(f.sol.reverse_calls.load(Ordering::SeqCst), 1);

    f.sol.set_behavior(ServiceBehavior::Answer);
    let result = f.service.get_domain(&address(1)).await;
    assert_eq!(result.domain.as_deref(), Some("alice.sol"));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_address_never_reaches_network() {
    let f = fixture();

    let result = f.service.get_domain("not-a-wallet").await;

    assert_eq!(result.source, ReverseSource::Truncated);
    assert_eq!(result.failure, Some(LookupFailure::InvalidInput));
    assert_eq!(network_calls(&f), 0);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_service_returns_truncated() {
    let f = fixture_with(
        ReverseConfig {
            enabled: false,
            ..reverse_config(10)
        },
        fast_rate_limit(),
        MockNameService::new(DomainSuffix::Sol),
        MockNameService::new(DomainSuffix::Skr),
    );

    let result = f.service.get_domain(TOLY_ADDRESS).await;

    assert_eq!(result.failure, Some(LookupFailure::Disabled));
    assert_eq!(result.domain, None);
    assert!(!f.service.is_enabled());
}

// ── concurrency ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_concurrent_lookups_share_one_network_call() {
    let f = fixture();
    let owner = address(1);

    let results = join_all((0..8).map(|_| f.service.get_domain(&owner))).await;

    assert!(results
        .iter()
        .all(|r| r.domain.as_deref() == Some("alice.sol")));
    assert_eq!(f.sol.reverse_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_lookup_racing_a_finished_leader_reuses_its_answer() {
    let store = Arc::new(MockDurableStore::new());
    store.set_get_delay(Duration::from_millis(50));
    let cache = Arc::new(DomainCache::new(&cache_config(100), store.clone()));
    let sol = Arc::new(
        MockNameService::new(DomainSuffix::Sol).with_domain("alice.sol", &address(1)),
    );
    let service = Arc::new(
        ReverseDomainService::new(
            &reverse_config(10),
            Arc::new(LocalRegistry::new()),
            Arc::clone(&cache),
            Arc::new(GlobalRateLimiter::new(&fast_rate_limit())),
        )
        .with_service(sol.clone()),
    );

    let owner = address(1);
    let lookup = {
        let service = Arc::clone(&service);
        let owner = owner.clone();
        tokio::spawn(async move { service.get_domain(&owner).await })
    };

    // the lookup has already read a miss when another lookup's answer lands
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache
        .set(&owner, Some("alice.sol".into()), LookupType::Reverse, CacheSource::Api)
        .await;

    let result = lookup.await.unwrap();
    assert_eq!(result.domain.as_deref(), Some("alice.sol"));
    assert_eq!(result.source, ReverseSource::Cache);
    assert_eq!(sol.total_calls(), 0);
}

// ── batch ────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_batch_summary_accounts_for_every_address() {
    let f = fixture_with(
        reverse_config(3),
        fast_rate_limit(),
        MockNameService::new(DomainSuffix::Sol).with_domain("alice.sol", &address(1)),
        MockNameService::new(DomainSuffix::Skr),
    );
    f.cache
        .set(&address(3), Some("cached.sol".into()), LookupType::Reverse, CacheSource::Api)
        .await;

    let input = vec![
        TOLY_ADDRESS.to_string(),
        address(1),
        address(3),
        address(4),
        "garbage".to_string(),
        address(1),
        format!("  {}  ", address(4)),
    ];
    let lookup = f.service.batch_get_domains(&input).await;

    let summary = &lookup.summary;
    assert_eq!(summary.total, 5);
    assert_eq!(lookup.results.len(), 5);
    assert_eq!(summary.accounted(), 5);
    assert_eq!(summary.from_registry, 1);
    assert_eq!(summary.from_cache, 1);
    assert_eq!(summary.from_api, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.rate_limited, 0);
    assert_eq!(
        lookup.results[&address(1)].domain.as_deref(),
        Some("alice.sol")
    );
}

#[tokio::test(start_paused = true)]
async fn test_batch_counts_rate_limited_separately() {
    let f = fixture_with(
        reverse_config(2),
        RateLimitConfig {
            max_retries: 0,
            ..fast_rate_limit()
        },
        MockNameService::new(DomainSuffix::Sol),
        MockNameService::new(DomainSuffix::Skr),
    );
    f.sol.set_behavior(ServiceBehavior::RateLimited);

    let input: Vec<String> = (10..15).map(address).collect();
    let lookup = f.service.batch_get_domains(&input).await;

    assert_eq!(lookup.results.len(), 5);
    assert_eq!(lookup.summary.rate_limited, 5);
    assert_eq!(lookup.summary.accounted(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_batch_pauses_between_chunks() {
    let f = fixture_with(
        ReverseConfig {
            batch_delay_ms: 500,
            ..reverse_config(2)
        },
        fast_rate_limit(),
        MockNameService::new(DomainSuffix::Sol).with_latency(Duration::ZERO),
        MockNameService::new(DomainSuffix::Skr).with_latency(Duration::ZERO),
    );
    let input: Vec<String> = (20..25).map(address).collect();

    let started = tokio::time::Instant::now();
    f.service.batch_get_domains(&input).await;

    // three chunks, two pauses
    assert!(started.elapsed() >= Duration::from_millis(1_000));
}

#[tokio::test(start_paused = true)]
async fn test_empty_batch() {
    let f = fixture();
    let lookup = f.service.batch_get_domains::<String>(&[]).await;
    assert_eq!(lookup.summary.total, 0);
    assert!(lookup.results.is_empty());
}

// ── warmup ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_warmup_only_fetches_unknown_addresses() {
    let f = fixture();
    f.cache
        .set(&address(3), None, LookupType::Reverse, CacheSource::Api)
        .await;
    let stats_before = f.cache.stats();

    let report = f
        .service
        .warmup_cache(&[TOLY_ADDRESS.to_string(), address(3), address(1)])
        .await;

    assert_eq!(report.requested, 3);
    assert_eq!(report.already_known, 2);
    assert_eq!(report.resolved, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(f.sol.reverse_calls.load(Ordering::SeqCst), 1);
    assert!(f.cache.contains(&address(1), LookupType::Reverse));

    // skipped addresses do not show up as cache lookups
    let stats_after = f.cache.stats();
    assert_eq!(stats_after.hits, stats_before.hits);
    assert_eq!(stats_after.misses, stats_before.misses + 1);
}
