mod cache_maintenance_port;
mod durable_store;
mod name_service;
mod rpc_transport;

pub use cache_maintenance_port::{CacheCleanupOutcome, CacheMaintenancePort};
pub use durable_store::DurableStore;
pub use name_service::NameService;
pub use rpc_transport::RpcTransport;
