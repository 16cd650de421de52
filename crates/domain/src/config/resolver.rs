use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Forward (name -> address) resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    #[serde(default = "default_session_cache_ttl_secs")]
    pub session_cache_ttl_secs: u64,

    #[serde(default = "default_session_cache_capacity")]
    pub session_cache_capacity: usize,

    #[serde(default = "default_sns_proxy_url")]
    pub sns_proxy_url: String,
}

impl ResolverConfig {
    pub fn session_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.session_cache_ttl_secs)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            session_cache_ttl_secs: default_session_cache_ttl_secs(),
            session_cache_capacity: default_session_cache_capacity(),
            sns_proxy_url: default_sns_proxy_url(),
        }
    }
}

/// Reverse (address -> name) resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReverseConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

impl ReverseConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Default for ReverseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_batch_size: default_max_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

fn default_session_cache_ttl_secs() -> u64 {
    300
}

fn default_session_cache_capacity() -> usize {
    1_000
}

fn default_sns_proxy_url() -> String {
    "https://sns-sdk-proxy.bonfida.workers.dev".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    10
}

fn default_batch_delay_ms() -> u64 {
    100
}
