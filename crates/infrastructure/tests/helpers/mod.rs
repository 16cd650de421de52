#![allow(dead_code)]

mod http;
mod mocks;

pub use http::{local_client, serve_once};
pub use mocks::{MockDurableStore, MockNameService, MockRpcTransport, ServiceBehavior};

use ferrous_names_domain::config::{CacheConfig, RateLimitConfig, ResolverConfig, ReverseConfig};

pub const TOLY_ADDRESS: &str = "86xCnPeV69n6t3DnyGvkKobf9FdN2H9oiVDdaMpo2MMY";

/// Deterministic, valid 32-byte base58 address.
pub fn address(seed: u8) -> String {
    bs58::encode([seed; 32]).into_string()
}

pub fn fast_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        max_requests_per_second: 100.0,
        max_retries: 3,
        base_delay_ms: 100,
        max_delay_ms: 1_000,
        jitter_ratio: 0.3,
        circuit_breaker_threshold: 50,
        circuit_breaker_cooldown_ms: 5_000,
        reject_while_open: false,
    }
}

pub fn cache_config(max_entries: usize) -> CacheConfig {
    CacheConfig {
        max_entries,
        ..CacheConfig::default()
    }
}

pub fn reverse_config(max_batch_size: usize) -> ReverseConfig {
    ReverseConfig {
        enabled: true,
        max_batch_size,
        batch_delay_ms: 100,
    }
}

pub fn resolver_config() -> ResolverConfig {
    ResolverConfig {
        session_cache_ttl_secs: 300,
        session_cache_capacity: 100,
        ..ResolverConfig::default()
    }
}
