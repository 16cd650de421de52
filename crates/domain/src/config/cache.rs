use serde::{Deserialize, Serialize};
use std::time::Duration;

const MS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_forward_days")]
    pub ttl_forward_days: f64,

    /// Reverse mappings change less often than forward ones.
    #[serde(default = "default_ttl_reverse_days")]
    pub ttl_reverse_days: f64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl CacheConfig {
    pub fn forward_ttl(&self) -> Duration {
        days_to_duration(self.ttl_forward_days)
    }

    pub fn reverse_ttl(&self) -> Duration {
        days_to_duration(self.ttl_reverse_days)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_forward_days: default_ttl_forward_days(),
            ttl_reverse_days: default_ttl_reverse_days(),
            max_entries: default_max_entries(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

fn days_to_duration(days: f64) -> Duration {
    if !days.is_finite() || days <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_millis((days * MS_PER_DAY) as u64)
}

fn default_ttl_forward_days() -> f64 {
    1.0
}

fn default_ttl_reverse_days() -> f64 {
    7.0
}

fn default_max_entries() -> usize {
    10_000
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}
