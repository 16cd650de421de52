use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::cache::CacheConfig;
use super::database::DatabaseConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::rate_limit::RateLimitConfig;
use super::registry::RegistryConfig;
use super::resolver::{ResolverConfig, ReverseConfig};
use super::rpc::RpcConfig;

const ENV_PREFIX: &str = "FERROUS_NAMES_";

/// Main configuration structure for Ferrous Names
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Persistent cache TTLs, capacity and cleanup cadence
    #[serde(default)]
    pub cache: CacheConfig,

    /// Global request scheduler
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Forward resolution
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Reverse resolution
    #[serde(default)]
    pub reverse: ReverseConfig,

    /// Upstream JSON-RPC endpoint and registry programs
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Local registry seeding
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Durable cache storage
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-names.toml in current directory
    /// 3. /etc/ferrous-names/config.toml
    /// 4. Default configuration
    ///
    /// Environment overrides are applied on top of the file, and command-line
    /// overrides on top of both.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies `FERROUS_NAMES_*` overrides. Values that fail to parse are
    /// ignored so a typo never replaces a safe default with garbage.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        override_parsed(&mut self.cache.ttl_forward_days, env("CACHE_TTL_FORWARD_DAYS"), |v| {
            v.is_finite() && *v > 0.0
        });
        override_parsed(&mut self.cache.ttl_reverse_days, env("CACHE_TTL_REVERSE_DAYS"), |v| {
            v.is_finite() && *v > 0.0
        });
        override_parsed(&mut self.cache.max_entries, env("CACHE_MAX_ENTRIES"), |v| *v > 0);
        override_parsed(
            &mut self.cache.cleanup_interval_secs,
            env("CACHE_CLEANUP_INTERVAL_SECS"),
            |v| *v > 0,
        );
        override_parsed(
            &mut self.rate_limit.max_requests_per_second,
            env("MAX_REQUESTS_PER_SECOND"),
            |v| v.is_finite() && *v > 0.0,
        );
        override_parsed(&mut self.reverse.max_batch_size, env("MAX_BATCH_SIZE"), |v| *v > 0);
        override_parsed(&mut self.reverse.enabled, env("REVERSE_ENABLED"), |_| true);

        if let Some(url) = env("RPC_URL").filter(|u| !u.trim().is_empty()) {
            self.rpc.url = url.trim().to_string();
        }
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(url) = overrides.rpc_url {
            self.rpc.url = url;
        }
        if let Some(db) = overrides.database_path {
            self.database.path = db;
        }
        if overrides.memory_only {
            self.database.enabled = false;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_entries == 0 {
            return Err(ConfigError::Validation(
                "cache.max_entries must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit.max_requests_per_second <= 0.0 {
            return Err(ConfigError::Validation(
                "rate_limit.max_requests_per_second must be positive".to_string(),
            ));
        }

        if self.rate_limit.circuit_breaker_threshold == 0 {
            return Err(ConfigError::Validation(
                "rate_limit.circuit_breaker_threshold must be at least 1".to_string(),
            ));
        }

        if self.rate_limit.max_delay_ms < self.rate_limit.base_delay_ms {
            return Err(ConfigError::Validation(format!(
                "rate_limit.max_delay_ms ({}) is lower than base_delay_ms ({})",
                self.rate_limit.max_delay_ms, self.rate_limit.base_delay_ms
            )));
        }

        if !(0.0..=1.0).contains(&self.rate_limit.jitter_ratio) {
            return Err(ConfigError::Validation(
                "rate_limit.jitter_ratio must be within 0.0..=1.0".to_string(),
            ));
        }

        if self.reverse.max_batch_size == 0 {
            return Err(ConfigError::Validation(
                "reverse.max_batch_size must be greater than 0".to_string(),
            ));
        }

        if self.rpc.url.is_empty() {
            return Err(ConfigError::Validation("rpc.url cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = self.to_toml()?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new("ferrous-names.toml").exists() {
            Some("ferrous-names.toml".to_string())
        } else if std::path::Path::new("/etc/ferrous-names/config.toml").exists() {
            Some("/etc/ferrous-names/config.toml".to_string())
        } else {
            None
        }
    }
}

fn override_parsed<T, P>(target: &mut T, raw: Option<String>, accept: P)
where
    T: FromStr,
    P: Fn(&T) -> bool,
{
    if let Some(value) = raw.and_then(|r| r.trim().parse::<T>().ok()) {
        if accept(&value) {
            *target = value;
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub rpc_url: Option<String>,
    pub database_path: Option<String>,
    pub memory_only: bool,
    pub log_level: Option<String>,
}
