pub mod cache;
pub mod rate_limiter;
pub mod registry;
pub mod resolver;
pub mod services;
pub mod transport;
