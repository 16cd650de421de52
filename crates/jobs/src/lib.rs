pub mod cache_maintenance;
pub mod runner;
pub mod wal_checkpoint;

pub use cache_maintenance::CacheMaintenanceJob;
pub use runner::JobRunner;
pub use wal_checkpoint::WalCheckpointJob;
