pub mod cache;
pub mod database;
pub mod errors;
pub mod logging;
pub mod rate_limit;
pub mod registry;
pub mod resolver;
pub mod root;
pub mod rpc;

pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use rate_limit::RateLimitConfig;
pub use registry::RegistryConfig;
pub use resolver::{ResolverConfig, ReverseConfig};
pub use root::{CliOverrides, Config};
pub use rpc::RpcConfig;
